use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::Url;
use tracing::{info, warn};

use super::{jar_store::JarCredentialStore, memory_store::MemoryCredentialStore};
use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::models::CachedUser;

/// The only code path allowed to touch the access cookie and the cached user.
///
/// Reads never fail: anything unreadable is reported as absent.
pub trait CredentialStore: Send + Sync {
    fn name(&self) -> &str;

    /// Name of the readable access cookie.
    fn cookie_name(&self) -> &str {
        "access"
    }

    /// The access cookie, falling back to the token in the cached user.
    fn access_token(&self) -> Option<String>;

    /// Replaces the access cookie.
    fn set_access_token(&self, token: &str);

    fn cached_user(&self) -> Option<CachedUser>;

    fn cache_user(&self, user: &CachedUser) -> Result<(), SessionError>;

    /// Removes both the cookie and the cached user. Idempotent.
    fn clear(&self);
}

/// Parses a raw cached-user entry, treating malformed content as absent.
pub(crate) fn parse_cached_user(raw: &str, source: &str) -> Option<CachedUser> {
    match serde_json::from_str::<CachedUser>(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Ignoring malformed cached user in {}: {}", source, e);
            None
        }
    }
}

pub(crate) fn token_from_cache(user: Option<CachedUser>) -> Option<String> {
    user.and_then(|u| u.token).filter(|t| !t.trim().is_empty())
}

/// Creates the configured credential store. The jar is the one the HTTP
/// client sends cookies from, so server-set cookies land where we read them.
pub fn create_store(config: &StoreConfig, jar: Arc<Jar>, origin: &Url) -> Arc<dyn CredentialStore> {
    match config {
        StoreConfig::Jar(cfg) => {
            info!(
                "Using cookie jar credential store (cookie='{}', cache={:?})",
                cfg.cookie_name, cfg.user_cache_path
            );
            Arc::new(JarCredentialStore::new(
                jar,
                origin.clone(),
                &cfg.cookie_name,
                cfg.user_cache_path.clone(),
            ))
        }
        StoreConfig::Memory => {
            info!("Using in-memory credential store");
            Arc::new(MemoryCredentialStore::new())
        }
    }
}
