//! Structural decoding of access tokens.
//!
//! The client never holds the signing key, so only the payload is decoded.
//! Signature and audience checks belong to the backend; expiry is checked
//! by the session layer against the wall clock.

use jsonwebtoken::{decode as jwt_decode, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::models::Claims;
use crate::utils::log_throttle::{should_emit, REPEATED_WARNING_WINDOW};

fn structural_validation() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Decodes `token` into claims, reporting why it failed.
pub fn try_decode(token: &str) -> Result<Claims, SessionError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    if token.is_empty() {
        return Err(SessionError::Decode("token is empty".to_string()));
    }

    let data = jwt_decode::<Claims>(token, &DecodingKey::from_secret(&[]), &structural_validation())
        .map_err(|e| SessionError::Decode(e.to_string()))?;
    debug!(
        "Decoded access token for subject '{}' with role '{}'",
        data.claims.subject, data.claims.role
    );
    Ok(data.claims)
}

/// Decodes `token`, logging a warning and returning `None` when it is malformed.
pub fn decode(token: &str) -> Option<Claims> {
    match try_decode(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            if let Some(suppressed) = should_emit("codec.decode", REPEATED_WARNING_WINDOW) {
                warn!(suppressed, "Ignoring undecodable access token: {}", e);
            }
            None
        }
    }
}

pub fn is_expired(claims: &Claims, now_seconds: i64) -> bool {
    claims.is_expired(now_seconds)
}

pub fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mint_token, mint_token_with};
    use serde_json::json;

    #[test]
    fn test_decode_round_trip() {
        let exp = now_seconds() + 600;
        let token = mint_token("parent", exp);
        let claims = decode(&token).expect("token should decode");
        assert_eq!(claims.role, "parent");
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.expires_at, exp);
        assert!(claims.issued_at.is_some());
    }

    #[test]
    fn test_decode_ignores_signature_and_expiry() {
        // Signed with a key the client never sees, and already expired.
        let token = mint_token_with(
            &json!({ "sub": "7", "role": "admin", "exp": 10 }),
            b"server-only-secret",
        );
        let claims = decode(&token).expect("structural decode should succeed");
        assert_eq!(claims.expires_at, 10);
        assert!(is_expired(&claims, now_seconds()));
    }

    #[test]
    fn test_decode_accepts_bearer_prefix() {
        let token = format!("Bearer {}", mint_token("teacher", now_seconds() + 60));
        assert!(decode(&token).is_some());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_none());
        assert!(decode("not-a-jwt").is_none());
        assert!(decode("a.b.c").is_none());
        assert!(matches!(try_decode("a.b"), Err(SessionError::Decode(_))));
    }

    #[test]
    fn test_decode_requires_expiry_claim() {
        let token = mint_token_with(&json!({ "sub": "7", "role": "admin" }), b"k");
        assert!(decode(&token).is_none());
    }
}
