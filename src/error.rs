//! Error taxonomy for the session core.
//!
//! Every variant carries owned strings so a single refresh outcome can be
//! cloned out to all callers waiting on the same in-flight cycle.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Token present but not a decodable JWT.
    #[error("failed to decode access token: {0}")]
    Decode(String),

    /// The refresh endpoint rejected the cycle or could not be reached.
    #[error("token refresh failed: {0}")]
    Refresh(String),

    /// A request stayed unauthorized after the session continuity flow ran.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server still refuses the request with 403 after a refresh.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No response was received at all.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success status from a business endpoint.
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Response body did not match the endpoint's schema.
    #[error("unexpected response shape: {0}")]
    Schema(String),

    #[error("credential storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Transport-level failure with no HTTP response, the `ERR_NETWORK` case.
    pub fn is_network(&self) -> bool {
        matches!(self, SessionError::Network(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SessionError::Status { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_builder() {
            return SessionError::Schema(err.to_string());
        }
        match err.status() {
            Some(status) => SessionError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                body: String::new(),
            },
            None => SessionError::Network(err.to_string()),
        }
    }
}

impl From<figment::Error> for SessionError {
    fn from(err: figment::Error) -> Self {
        SessionError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_flagged() {
        assert!(SessionError::Network("connection refused".into()).is_network());
        assert!(!SessionError::Refresh("status 500".into()).is_network());
    }

    #[test]
    fn test_status_exposes_status_code() {
        let err = SessionError::Status {
            status: 404,
            url: "http://localhost/api/v1/account/profile".into(),
            body: "not found".into(),
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(SessionError::Decode("bad".into()).status(), None);
    }
}
