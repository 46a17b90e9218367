use serde::Serialize;

use super::claims::Claims;

/// Snapshot of what a consumer should render.
///
/// Created fresh by each query; never shared between consumers.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<Claims>,
    pub loading: bool,
}

impl SessionState {
    pub fn loading() -> Self {
        SessionState {
            is_authenticated: false,
            user: None,
            loading: true,
        }
    }

    pub fn from_claims(claims: Option<Claims>) -> Self {
        SessionState {
            is_authenticated: claims.is_some(),
            user: claims,
            loading: false,
        }
    }
}
