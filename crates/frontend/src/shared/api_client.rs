//! Authenticated access to the SIEM API.
//!
//! Every call carries the session credential and a cache-busting token.
//! A 401 from any endpoint ends the session and sends the user to the
//! login page; the caller just sees "no data".

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use contracts::shared::envelope::Envelope;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use super::api_utils::{api_base, with_cache_buster};
use super::transport::GlooTransport;
use crate::system::auth::guard::{BrowserNavigator, Navigator, LOGIN_PATH};
use crate::system::auth::storage::{LocalStorageSession, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Outbound HTTP seam. The browser implementation is [`GlooTransport`].
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}")]
    Transport { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("request could not be encoded: {0}")]
    Encode(String),

    /// The caller aborted the call through its [`CancelHandle`].
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Caller side of a cancellation channel.
#[derive(Debug, Clone)]
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.abort();
    }
}

/// Request side of a cancellation channel; consumed by one call.
#[derive(Debug)]
pub struct CancelSignal(AbortRegistration);

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (handle, registration) = AbortHandle::new_pair();
    (CancelHandle(handle), CancelSignal(registration))
}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    transport: Rc<dyn HttpTransport>,
    session: Rc<dyn SessionStore>,
    navigator: Rc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        base: impl Into<String>,
        transport: Rc<dyn HttpTransport>,
        session: Rc<dyn SessionStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            base: base.into(),
            transport,
            session,
            navigator,
        }
    }

    /// Client wired to the browser: fetch, localStorage, window.location.
    pub fn browser() -> Self {
        Self::new(
            api_base(),
            Rc::new(GlooTransport),
            Rc::new(LocalStorageSession),
            Rc::new(BrowserNavigator),
        )
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn transport(&self) -> Rc<dyn HttpTransport> {
        self.transport.clone()
    }

    pub fn session_store(&self) -> Rc<dyn SessionStore> {
        self.session.clone()
    }

    pub fn navigator(&self) -> Rc<dyn Navigator> {
        self.navigator.clone()
    }

    /// Perform a call and decode the response envelope.
    ///
    /// - `Ok(None)`: the session expired (401) or the body was not a JSON object.
    /// - `Err(ApiError::Transport)`: any other non-2xx status.
    /// - `Err(ApiError::Cancelled)`: `cancel` fired before the response arrived.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        cancel: Option<CancelSignal>,
    ) -> Result<Option<Envelope>, ApiError> {
        let Some(response) = self.send(endpoint, method, body, cancel).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Value>(&response.body) {
            Ok(value) => {
                let envelope = Envelope::from_value(value);
                if envelope.is_none() {
                    warn!("Unexpected non-object response from {}", endpoint);
                }
                Ok(envelope)
            }
            Err(e) => {
                warn!("Unexpected non-JSON response from {}: {}", endpoint, e);
                Ok(None)
            }
        }
    }

    pub async fn get(&self, endpoint: &str) -> Result<Option<Envelope>, ApiError> {
        self.call(endpoint, Method::Get, None, None).await
    }

    /// POST a JSON body and return the raw response bytes (file downloads).
    pub async fn download(
        &self,
        endpoint: &str,
        body: &Value,
        cancel: Option<CancelSignal>,
    ) -> Result<Option<Vec<u8>>, ApiError> {
        let response = self.send(endpoint, Method::Post, Some(body), cancel).await?;
        Ok(response.map(|r| r.body))
    }

    async fn send(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        cancel: Option<CancelSignal>,
    ) -> Result<Option<HttpResponse>, ApiError> {
        let request = self.build_request(endpoint, method, body)?;
        debug!("{} {}", method, endpoint);

        let sent = match cancel {
            Some(CancelSignal(registration)) => {
                Abortable::new(self.transport.send(request), registration)
                    .await
                    .map_err(|_| ApiError::Cancelled)?
            }
            None => self.transport.send(request).await,
        };
        let response = sent.map_err(|e| ApiError::Network(e.0))?;

        if response.status == 401 {
            warn!("{} answered 401, ending session", endpoint);
            self.end_session();
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ApiError::Transport {
                status: response.status,
            });
        }
        Ok(Some(response))
    }

    fn build_request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let url = with_cache_buster(&format!("{}{}", self.base, endpoint), &token);

        let mut headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("Cache-Control", "no-cache, no-store, must-revalidate".to_string()),
            ("Pragma", "no-cache".to_string()),
        ];
        if let Some(session) = self.session.load() {
            headers.push(("Authorization", format!("Basic {}", session.credential)));
        }

        let body = match (method, body) {
            (Method::Post, Some(value)) => {
                Some(serde_json::to_string(value).map_err(|e| ApiError::Encode(e.to_string()))?)
            }
            _ => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Forget the session and go to the login page.
    pub fn end_session(&self) {
        self.session.clear();
        self.navigator.go_to(LOGIN_PATH);
    }
}
