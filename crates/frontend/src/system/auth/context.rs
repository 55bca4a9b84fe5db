use contracts::system::auth::Session;

use super::guard::LOGIN_PATH;
use crate::shared::api_client::ApiClient;
use crate::shared::config::{client_config, ClientConfig};

/// Everything a view needs, built once when the view starts.
///
/// Views never reach for globals: the client, the session and the settings
/// are threaded through from here.
#[derive(Clone)]
pub struct ViewContext {
    pub api: ApiClient,
    pub session: Session,
    pub config: ClientConfig,
}

impl ViewContext {
    /// Returns `None` after redirecting to the login page when nobody is logged in.
    pub fn bootstrap(api: ApiClient, config: ClientConfig) -> Option<Self> {
        match api.session_store().load() {
            Some(session) => Some(Self {
                api,
                session,
                config,
            }),
            None => {
                log::info!("No session, redirecting to {}", LOGIN_PATH);
                api.navigator().go_to(LOGIN_PATH);
                None
            }
        }
    }

    pub fn browser() -> Option<Self> {
        Self::bootstrap(ApiClient::browser(), client_config().clone())
    }

    pub fn username(&self) -> &str {
        &self.session.username
    }

    pub fn logout(&self) {
        log::info!("User {} logged out", self.session.username);
        self.api.end_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{ScriptedTransport, TestBed};
    use crate::system::auth::storage::SessionStore;
    use std::rc::Rc;

    #[test]
    fn test_bootstrap_with_session() {
        let bed = TestBed::new();

        let ctx = ViewContext::bootstrap(bed.api.clone(), ClientConfig::default()).unwrap();

        assert_eq!(ctx.username(), "admin");
        assert!(bed.navigator.visits().is_empty());
    }

    #[test]
    fn test_bootstrap_without_session_redirects() {
        let bed = TestBed::with_transport(Rc::new(ScriptedTransport::default()), None);

        assert!(ViewContext::bootstrap(bed.api.clone(), ClientConfig::default()).is_none());
        assert_eq!(bed.navigator.visits(), vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn test_logout_clears_session() {
        let bed = TestBed::new();
        let ctx = ViewContext::bootstrap(bed.api.clone(), ClientConfig::default()).unwrap();

        ctx.logout();

        assert!(bed.sessions.load().is_none());
        assert_eq!(bed.navigator.visits(), vec![LOGIN_PATH.to_string()]);
    }
}
