//! Token minting and collaborator stubs shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use crate::codec::{self, now_seconds};
use crate::error::SessionError;
use crate::models::Claims;
use crate::refresh::Refresher;
use crate::store::CredentialStore;

pub fn mint_token_with(claims: &Value, secret: &[u8]) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).expect("Failed to mint token")
}

pub fn mint_token(role: &str, exp: i64) -> String {
    mint_token_with(
        &json!({ "sub": "user-1", "role": role, "iat": now_seconds(), "exp": exp }),
        b"test-secret",
    )
}

pub fn valid_token(role: &str) -> String {
    mint_token(role, now_seconds() + 3600)
}

pub fn expired_token(role: &str) -> String {
    mint_token(role, now_seconds() - 60)
}

/// Refresher that counts calls and either hands out a fixed token or fails.
pub struct StubRefresher {
    calls: AtomicUsize,
    token: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl StubRefresher {
    pub fn succeeding(token: String) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            token: Some(token),
            store: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            token: None,
            store: None,
        }
    }

    /// Also writes the new token into `store`, as the real cookie side effect would.
    pub fn writing_to(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Refresher for StubRefresher {
    async fn refresh(&self) -> Result<Claims, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| SessionError::Refresh("refresh endpoint returned 401 Unauthorized".to_string()))?;
        if let Some(store) = &self.store {
            store.set_access_token(token);
        }
        codec::try_decode(token)
    }
}
