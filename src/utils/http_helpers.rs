use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};

use crate::error::SessionError;

/// Builds the single HTTP client every outbound call goes through.
///
/// Cookies (including the HttpOnly refresh credential) live in `jar` and are
/// attached automatically; JSON is the default content type.
pub fn build_http_client(jar: Arc<Jar>, timeout: Duration) -> Result<Client, SessionError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .cookie_provider(jar)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| SessionError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// 401 and 403 both trigger the session continuity flow.
pub fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Converts a non-success response into `SessionError::Status`, keeping the body.
pub async fn error_for_status(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(SessionError::Status {
        status: status.as_u16(),
        url,
        body,
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
