//! The outbound request pipeline.
//!
//! Every API call goes through [`HttpGateway::execute`]. A 401/403 triggers
//! one refresh cycle and one replay of the original request; anything that
//! still fails surfaces as a rejected call plus, where the session is gone,
//! a login redirect.

use std::sync::Arc;

use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::auth::{
    LOGIN_PATH, PASSWORD_FORGOT_PATH, PASSWORD_FORGOT_RESET_PATH, PASSWORD_RESET_CONFIRM_PATH,
    REGISTER_CODE_VERIFY_PATH, REGISTER_OTP_VERIFY_PATH, REGISTER_PATH,
};
use crate::error::SessionError;
use crate::navigation::{Navigator, SESSION_EXPIRED_MESSAGE};
use crate::refresh::{Refresher, REFRESH_PATH};
use crate::utils::http_helpers::{error_for_status, is_auth_failure};

/// Endpoints that take credentials in the request rather than from the
/// session. A 401/403 there means bad input, not a stale session, so it is
/// returned untouched.
const CREDENTIAL_PATHS: &[&str] = &[
    LOGIN_PATH,
    REGISTER_PATH,
    REGISTER_OTP_VERIFY_PATH,
    REGISTER_CODE_VERIFY_PATH,
    PASSWORD_FORGOT_PATH,
    PASSWORD_FORGOT_RESET_PATH,
    PASSWORD_RESET_CONFIRM_PATH,
];

pub struct HttpGateway {
    http: Client,
    base_url: Url,
    refresh_url: Url,
    refresher: Arc<dyn Refresher>,
    navigator: Navigator,
}

impl HttpGateway {
    pub fn new(
        http: Client,
        base_url: Url,
        refresher: Arc<dyn Refresher>,
        navigator: Navigator,
    ) -> Result<Self, SessionError> {
        let refresh_url = base_url
            .join(REFRESH_PATH)
            .map_err(|e| SessionError::Config(format!("Invalid refresh endpoint: {}", e)))?;
        Ok(Self {
            http,
            base_url,
            refresh_url,
            refresher,
            navigator,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SessionError::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    /// Starts a request against `path` under the API base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SessionError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    fn same_path(a: &Url, b: &Url) -> bool {
        a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
    }

    fn is_credential_endpoint(&self, url: &Url) -> bool {
        CREDENTIAL_PATHS.iter().any(|path| {
            self.url(path)
                .is_ok_and(|endpoint| Self::same_path(url, &endpoint))
        })
    }

    /// Sends `request` with session continuity.
    ///
    /// Non-auth statuses are returned as-is; callers decide what a 404 or
    /// 500 means for them.
    pub async fn execute(&self, request: Request) -> Result<Response, SessionError> {
        let method = request.method().clone();
        let url = request.url().clone();
        let replay = request.try_clone();

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !is_auth_failure(status) {
            return Ok(response);
        }

        if Self::same_path(&url, &self.refresh_url) {
            warn!("Refresh endpoint itself answered {}; ending session", status);
            self.navigator.to_login(Some(SESSION_EXPIRED_MESSAGE));
            return Err(SessionError::Unauthorized(format!(
                "refresh endpoint returned {}",
                status
            )));
        }

        if self.is_credential_endpoint(&url) {
            debug!("{} {} answered {}, not a session failure", method, url.path(), status);
            return Ok(response);
        }

        info!("{} {} answered {}; refreshing session", method, url.path(), status);
        if let Err(e) = self.refresher.refresh().await {
            warn!("Session refresh failed, redirecting to login: {}", e);
            self.navigator.to_login(Some(SESSION_EXPIRED_MESSAGE));
            return Err(e);
        }

        let Some(replay) = replay else {
            return Err(SessionError::Unauthorized(format!(
                "{} {} has a streaming body and cannot be replayed",
                method,
                url.path()
            )));
        };

        debug!("Replaying {} {} after refresh", method, url.path());
        let retried = self.http.execute(replay).await?;
        if is_auth_failure(retried.status()) {
            warn!(
                "{} {} still answered {} after refresh",
                method,
                url.path(),
                retried.status()
            );
            let detail = format!("{} {} returned {} after refresh", method, url.path(), retried.status());
            return Err(if retried.status() == StatusCode::FORBIDDEN {
                SessionError::Forbidden(detail)
            } else {
                SessionError::Unauthorized(detail)
            });
        }
        Ok(retried)
    }

    /// Builds and executes `builder` through the gateway.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SessionError> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// Sends `builder` and decodes a successful JSON body.
    pub async fn send_for_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, SessionError> {
        let response = error_for_status(self.send(builder).await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SessionError::Schema(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.send_for_json(self.request(Method::GET, path)?).await
    }

    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, SessionError> {
        self.send_for_json(self.request(method, path)?.json(body)).await
    }
}
