use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use tracing::{debug, warn};

use super::base::{parse_cached_user, token_from_cache, CredentialStore};
use crate::error::SessionError;
use crate::models::CachedUser;

/// Credential store backed by the HTTP client's cookie jar, with the cached
/// user persisted as a JSON file.
pub struct JarCredentialStore {
    jar: Arc<Jar>,
    origin: Url,
    cookie_name: String,
    user_cache_path: Option<PathBuf>,
}

impl JarCredentialStore {
    pub fn new(
        jar: Arc<Jar>,
        origin: Url,
        cookie_name: &str,
        user_cache_path: Option<PathBuf>,
    ) -> Self {
        Self {
            jar,
            origin,
            cookie_name: cookie_name.to_string(),
            user_cache_path,
        }
    }

    fn cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.cookie_name)
    }
}

/// Finds `name` in a `Cookie` header value such as `a=1; access=xyz`.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CredentialStore for JarCredentialStore {
    fn name(&self) -> &str {
        "cookie-jar"
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn access_token(&self) -> Option<String> {
        if let Some(token) = self.cookie() {
            return Some(token);
        }
        debug!("No '{}' cookie, falling back to cached user", self.cookie_name);
        token_from_cache(self.cached_user())
    }

    fn set_access_token(&self, token: &str) {
        self.jar.add_cookie_str(
            &format!("{}={}; Path=/", self.cookie_name, token),
            &self.origin,
        );
    }

    fn cached_user(&self) -> Option<CachedUser> {
        let path = self.user_cache_path.as_ref()?;
        match fs::read_to_string(path) {
            Ok(raw) => parse_cached_user(&raw, &path.display().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read cached user at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn cache_user(&self, user: &CachedUser) -> Result<(), SessionError> {
        let Some(path) = self.user_cache_path.as_ref() else {
            return Ok(());
        };
        let body = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(path, body)
            .map_err(|e| SessionError::Storage(format!("{}: {}", path.display(), e)))
    }

    fn clear(&self) {
        // An already-expired cookie evicts the stored one.
        self.jar.add_cookie_str(
            &format!(
                "{}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                self.cookie_name
            ),
            &self.origin,
        );
        if let Some(path) = self.user_cache_path.as_ref() {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed cached user at {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove cached user at {}: {}", path.display(), e),
            }
        }
    }
}
