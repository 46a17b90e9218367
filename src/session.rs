//! Session queries over the credential store.
//!
//! Nothing here caches claims: each call re-reads the store, re-decodes the
//! token and re-checks expiry against the clock.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::codec::{self, now_seconds};
use crate::models::{Claims, SessionState};
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// A token string is present, valid or not.
    pub fn has_token(&self) -> bool {
        self.store.access_token().is_some()
    }

    /// Claims of the stored token, or `None` when it is absent, undecodable
    /// or expired.
    pub fn current_claims(&self) -> Option<Claims> {
        let token = self.store.access_token()?;
        let claims = codec::decode(&token)?;
        if codec::is_expired(&claims, now_seconds()) {
            debug!("Access token for '{}' expired at {}", claims.subject, claims.expires_at);
            return None;
        }
        Some(claims)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_claims().is_some()
    }

    /// A token is present but yields no valid claims. Distinguishes
    /// "session expired" from "not logged in".
    pub fn is_token_expired(&self) -> bool {
        self.has_token() && self.current_claims().is_none()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.current_claims().is_some_and(|c| c.has_role(role))
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.current_claims().is_some_and(|c| c.has_any_role(roles))
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_claims(self.current_claims())
    }

    /// Polls for claims up to `max_attempts` times, `delay` apart.
    ///
    /// Only meant for the window right after login where the server has set
    /// the cookie but it is not yet readable here.
    pub async fn wait_for_token_availability(
        &self,
        max_attempts: u32,
        delay: Duration,
    ) -> Option<Claims> {
        for attempt in 1..=max_attempts {
            if let Some(claims) = self.current_claims() {
                debug!("Token available after {} attempt(s)", attempt);
                return Some(claims);
            }
            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }
        debug!("Token still unavailable after {} attempt(s)", max_attempts);
        None
    }
}
