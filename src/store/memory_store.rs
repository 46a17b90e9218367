use std::sync::RwLock;

use super::base::{parse_cached_user, token_from_cache, CredentialStore};
use crate::error::SessionError;
use crate::models::CachedUser;

/// Process-local credential store. The cached user is kept as raw JSON so
/// it goes through the same lenient parsing as the on-disk cache.
#[derive(Default)]
pub struct MemoryCredentialStore {
    cookie: RwLock<Option<String>>,
    user_entry: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the raw `user` entry, as an earlier session would have left it.
    pub fn with_user_entry(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.user_entry.write().unwrap_or_else(|p| p.into_inner()) = Some(raw.into());
        store
    }

    pub fn with_access_token(token: &str) -> Self {
        let store = Self::new();
        store.set_access_token(token);
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn access_token(&self) -> Option<String> {
        let cookie = self.cookie.read().unwrap_or_else(|p| p.into_inner()).clone();
        cookie.or_else(|| token_from_cache(self.cached_user()))
    }

    fn set_access_token(&self, token: &str) {
        *self.cookie.write().unwrap_or_else(|p| p.into_inner()) = Some(token.to_string());
    }

    fn cached_user(&self) -> Option<CachedUser> {
        let entry = self.user_entry.read().unwrap_or_else(|p| p.into_inner());
        entry.as_deref().and_then(|raw| parse_cached_user(raw, "memory"))
    }

    fn cache_user(&self, user: &CachedUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        *self.user_entry.write().unwrap_or_else(|p| p.into_inner()) = Some(raw);
        Ok(())
    }

    fn clear(&self) {
        *self.cookie.write().unwrap_or_else(|p| p.into_inner()) = None;
        *self.user_entry.write().unwrap_or_else(|p| p.into_inner()) = None;
    }
}
