//! API utilities for frontend-backend communication
//!
//! Provides helpers for constructing API URLs.

use super::config::client_config;

/// Get the base URL for API requests
///
/// Uses `api_base` from the client config when set, otherwise the origin
/// the page was served from (the API and the pages share a server).
///
/// # Returns
/// - API base URL like "http://localhost:8000"
/// - Empty string if window is not available
pub fn api_base() -> String {
    let configured = client_config().api_base.trim_end_matches('/');
    if !configured.is_empty() {
        return configured.to_string();
    }
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    window.location().origin().unwrap_or_default()
}

/// Append a cache-defeating query parameter to `url`.
///
/// # Example
/// ```rust
/// use siem_frontend::shared::api_utils::with_cache_buster;
/// assert_eq!(with_cache_buster("/api/events?page=2", "x1"), "/api/events?page=2&_t=x1");
/// ```
pub fn with_cache_buster(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}_t={}", url, separator, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_buster_separator() {
        assert_eq!(with_cache_buster("/api/dashboard/hosts", "a"), "/api/dashboard/hosts?_t=a");
        assert_eq!(with_cache_buster("/api/events?page=1", "b"), "/api/events?page=1&_t=b");
    }
}
