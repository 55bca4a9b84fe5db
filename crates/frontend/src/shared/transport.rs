use async_trait::async_trait;
use gloo_net::http::Request;

use super::api_client::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};

/// `fetch` through gloo-net.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = match request.body {
            Some(body) => builder
                .body(body)
                .map_err(|e| TransportFailure(format!("Failed to build request: {}", e)))?
                .send()
                .await,
            None => builder.send().await,
        }
        .map_err(|e| TransportFailure(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .binary()
            .await
            .map_err(|e| TransportFailure(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}
