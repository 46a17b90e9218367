use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::unwrap_envelope;
use crate::error::SessionError;

/// The legacy `user` entry cached next to the access cookie.
///
/// Only `token` matters to the session core; the rest is kept so the
/// cache round-trips with what the login flow writes.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Normalized login payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self, SessionError> {
        unwrap_envelope(value, "login response without `token` or `data.token`")
    }

    pub fn to_cached_user(&self) -> CachedUser {
        CachedUser {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            token: Some(self.token.clone()),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
