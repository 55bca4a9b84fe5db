use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use contracts::system::auth::{LoginRequest, LoginResponse, Session};

use crate::shared::api_client::{HttpRequest, HttpTransport, Method};

pub const LOGIN_ENDPOINT: &str = "/api/login";

/// `base64(user:pass)`, the value of a Basic authorization header.
pub fn encode_credential(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Login with username and password.
///
/// The returned session carries the server's token when it issued one,
/// otherwise the Basic credential computed here.
pub async fn login(
    transport: &dyn HttpTransport,
    base: &str,
    username: &str,
    password: &str,
) -> Result<Session, String> {
    let credential = encode_credential(username, password);
    let body = serde_json::to_string(&LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
    .map_err(|e| format!("Failed to serialize request: {}", e))?;

    let request = HttpRequest {
        method: Method::Post,
        url: format!("{}{}", base, LOGIN_ENDPOINT),
        headers: vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("Basic {}", credential)),
        ],
        body: Some(body),
    };

    let response = transport
        .send(request)
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.is_success() {
        log::warn!("Login rejected with HTTP {}", response.status);
        return Err("Invalid username or password".to_string());
    }

    let answer: LoginResponse = serde_json::from_slice(&response.body).unwrap_or_default();
    let credential = answer
        .token
        .filter(|token| !token.is_empty())
        .unwrap_or(credential);

    Ok(Session {
        credential,
        username: username.to_string(),
    })
}
