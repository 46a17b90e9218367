use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SessionError;

/// Some endpoints wrap their payload in `data`, others return it bare.
/// Both shapes are accepted; nothing else is.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

pub fn unwrap_envelope<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, SessionError> {
    match serde_json::from_value::<Envelope<T>>(value) {
        Ok(Envelope::Wrapped { data }) | Ok(Envelope::Bare(data)) => Ok(data),
        Err(e) => Err(SessionError::Schema(format!("{}: {}", what, e))),
    }
}
