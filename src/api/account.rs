use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use super::models::{Profile, ProfileUpdate};
use crate::error::SessionError;
use crate::gateway::HttpGateway;
use crate::models::unwrap_envelope;

pub const PROFILE_PATH: &str = "account/profile";

/// Profile endpoints. Both accept the bare or `data`-wrapped body.
pub struct AccountApi {
    gateway: Arc<HttpGateway>,
}

impl AccountApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn profile(&self) -> Result<Profile, SessionError> {
        let body: Value = self.gateway.get_json(PROFILE_PATH).await?;
        unwrap_envelope(body, "profile")
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, SessionError> {
        let body: Value = self
            .gateway
            .send_json(Method::PUT, PROFILE_PATH, update)
            .await?;
        unwrap_envelope(body, "updated profile")
    }
}
