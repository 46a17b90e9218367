//! Access token refresh against `POST /auth/refresh`.
//!
//! The refresh credential is an HttpOnly cookie held by the jar, so the
//! request carries no body. The server answers by setting a new access
//! cookie. Concurrent callers share one in-flight request.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::codec::{self, now_seconds};
use crate::error::SessionError;
use crate::models::Claims;
use crate::store::CredentialStore;

pub const REFRESH_PATH: &str = "auth/refresh";

/// Anything that can run one refresh cycle. The route guard and the poller
/// depend on this rather than on the HTTP client.
#[async_trait::async_trait]
pub trait Refresher: Send + Sync {
    async fn refresh(&self) -> Result<Claims, SessionError>;
}

type Flight = Shared<BoxFuture<'static, Result<Claims, SessionError>>>;

pub struct RefreshClient {
    http: Client,
    endpoint: Url,
    store: Arc<dyn CredentialStore>,
    in_flight: Mutex<Option<Flight>>,
}

impl RefreshClient {
    pub fn new(http: Client, base_url: &Url, store: Arc<dyn CredentialStore>) -> Result<Self, SessionError> {
        let endpoint = base_url
            .join(REFRESH_PATH)
            .map_err(|e| SessionError::Config(format!("Invalid refresh endpoint: {}", e)))?;
        info!("Creating refresh client for {}", endpoint);
        Ok(Self {
            http,
            endpoint,
            store,
            in_flight: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn join_or_start(&self) -> Flight {
        let mut slot = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(flight) = slot.as_ref() {
            debug!("Joining refresh already in flight");
            return flight.clone();
        }
        let flight = refresh_once(self.http.clone(), self.endpoint.clone(), self.store.clone())
            .boxed()
            .shared();
        *slot = Some(flight.clone());
        flight
    }

    fn settle(&self, flight: &Flight) {
        let mut slot = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if slot.as_ref().is_some_and(|current| current.ptr_eq(flight)) {
            *slot = None;
        }
    }
}

#[async_trait::async_trait]
impl Refresher for RefreshClient {
    /// Runs one refresh cycle, or joins the one already running.
    ///
    /// Failures are terminal for the caller's flow; there is no retry here.
    async fn refresh(&self) -> Result<Claims, SessionError> {
        let flight = self.join_or_start();
        let result = flight.clone().await;
        self.settle(&flight);
        result
    }
}

async fn refresh_once(
    http: Client,
    endpoint: Url,
    store: Arc<dyn CredentialStore>,
) -> Result<Claims, SessionError> {
    info!("Refreshing access token via {}", endpoint);

    let response = http
        .post(endpoint)
        .send()
        .await
        .map_err(|e| SessionError::Refresh(format!("refresh request failed: {}", e)))?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        warn!("Refresh endpoint answered {}", status);
        return Err(SessionError::Refresh(format!(
            "refresh endpoint returned {}",
            status
        )));
    }

    let cookie_name = store.cookie_name().to_string();
    let fresh = response
        .cookies()
        .find(|c| c.name() == cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string());
    match fresh {
        Some(token) => store.set_access_token(&token),
        None => debug!("Refresh response set no '{}' cookie", cookie_name),
    }

    let token = store
        .access_token()
        .ok_or_else(|| SessionError::Refresh("no access token after refresh".to_string()))?;
    let claims = codec::try_decode(&token).map_err(|e| SessionError::Refresh(e.to_string()))?;
    if claims.is_expired(now_seconds()) {
        return Err(SessionError::Refresh(
            "refresh left an expired access token".to_string(),
        ));
    }

    info!(
        "Access token refreshed for '{}' (role '{}', expires at {})",
        claims.subject, claims.role, claims.expires_at
    );
    Ok(claims)
}
