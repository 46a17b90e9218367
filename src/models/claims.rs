use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Decoded, read-only projection of an access token.
///
/// Claims must be re-checked against the clock on every use; nothing in this
/// crate holds on to a `Claims` value across two session checks.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "sub", default)]
    pub subject: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    /// Unix timestamp in seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    pub fn is_expired(&self, now_seconds: i64) -> bool {
        self.expires_at < now_seconds
    }

    /// Negative once the token has expired.
    pub fn seconds_until_expiry(&self, now_seconds: i64) -> i64 {
        self.expires_at - now_seconds
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role.trim())
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, exp: i64) -> Claims {
        Claims {
            subject: "42".to_string(),
            role: role.to_string(),
            issued_at: Some(0),
            expires_at: exp,
        }
    }

    #[test]
    fn test_role_match_ignores_case() {
        let c = claims("Admin", 100);
        assert!(c.has_role("admin"));
        assert!(c.has_role("ADMIN"));
        assert!(!c.has_role("parent"));
        assert!(c.has_any_role(&["teacher", "admin"]));
        assert!(!c.has_any_role::<&str>(&[]));
    }

    #[test]
    fn test_expiry_boundary() {
        let c = claims("parent", 100);
        assert!(!c.is_expired(100));
        assert!(c.is_expired(101));
        assert_eq!(c.seconds_until_expiry(40), 60);
    }
}
