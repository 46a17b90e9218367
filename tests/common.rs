#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{encode, EncodingKey, Header};
use kindergate::codec::now_seconds;
use kindergate::config::load_config_from_str;
use kindergate::startup;
use kindergate::state::SessionKit;
use serde_json::json;

pub fn mint_token(sub: &str, role: &str, exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": sub, "role": role, "iat": now_seconds(), "exp": exp }),
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .expect("failed to mint token")
}

pub fn fresh_token(role: &str) -> String {
    mint_token("user-42", role, now_seconds() + 3600)
}

pub fn stale_token(role: &str) -> String {
    mint_token("user-42", role, now_seconds() - 30)
}

/// A token whose signature segment is junk. The client never verifies
/// signatures, so this must still decode.
pub fn forged_token(role: &str) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(
        json!({ "sub": "user-7", "role": role, "exp": now_seconds() + 600 }).to_string(),
    );
    format!("{}.{}.not-a-signature", header, payload)
}

pub fn config_yaml(server_url: &str, cache_path: Option<&Path>) -> String {
    let cache = cache_path
        .map(|p| format!("\n  user_cache_path: \"{}\"", p.display()))
        .unwrap_or_default();
    format!(
        r#"
version: "1.0.0"
api:
  base_url: "{server_url}/api/v1"
  timeout_in_ms: 3000
store:
  type: jar
  cookie_name: access{cache}
poller:
  interval_secs: 1
  threshold_secs: 120
token_wait:
  max_attempts: 3
  delay_ms: 10
logging:
  level: debug
  format: json
"#
    )
}

pub fn build_kit(server_url: &str, cache_path: Option<&Path>) -> SessionKit {
    let config = load_config_from_str(&config_yaml(server_url, cache_path))
        .expect("test config should load");
    startup::build(Arc::new(config)).expect("session kit should build")
}
