use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use super::models::{
    ApiMessage, ChangePasswordRequest, CodeVerifyRequest, ForgotPasswordRequest,
    NewPasswordRequest, OtpVerifyRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::config::TokenWaitConfig;
use crate::error::SessionError;
use crate::gateway::HttpGateway;
use crate::models::{Claims, LoginRequest, LoginResponse};
use crate::session::Session;
use crate::utils::http_helpers::{bearer, error_for_status};

pub const LOGIN_PATH: &str = "auth/login";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const REGISTER_PATH: &str = "auth/register";
pub const REGISTER_OTP_VERIFY_PATH: &str = "auth/register/otp/verify";
pub const REGISTER_CODE_VERIFY_PATH: &str = "auth/register/code/verify";
pub const PASSWORD_FORGOT_PATH: &str = "auth/password/forgot";
pub const PASSWORD_RESET_PATH: &str = "auth/password/reset";
pub const PASSWORD_FORGOT_RESET_PATH: &str = "auth/password/forgot/reset";
pub const PASSWORD_RESET_CONFIRM_PATH: &str = "auth/password/reset/confirm";

/// Login, logout, registration and password flows.
pub struct AuthApi {
    gateway: Arc<HttpGateway>,
    session: Session,
    token_wait: TokenWaitConfig,
}

impl AuthApi {
    pub fn new(gateway: Arc<HttpGateway>, session: Session, token_wait: TokenWaitConfig) -> Self {
        Self {
            gateway,
            session,
            token_wait,
        }
    }

    /// Logs in and returns the new session's claims.
    ///
    /// The server sets the access cookie; the token from the body is also
    /// cached as the legacy `user` entry. Claims are then awaited for a bounded
    /// number of attempts in case the cookie is not readable straight away.
    pub async fn login(&self, email: &str, password: &str) -> Result<Claims, SessionError> {
        info!("Logging in as '{}'", email);
        let body: Value = self
            .gateway
            .send_json(Method::POST, LOGIN_PATH, &LoginRequest { email, password })
            .await?;
        let login = LoginResponse::from_value(body)?;
        self.session.store().cache_user(&login.to_cached_user())?;

        self.session
            .wait_for_token_availability(
                self.token_wait.max_attempts,
                Duration::from_millis(self.token_wait.delay_ms),
            )
            .await
            .ok_or_else(|| {
                SessionError::Unauthorized("access token not readable after login".to_string())
            })
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.logout_with(Method::POST).await
    }

    /// Invalidates the server session with `method` (POST or GET). Local
    /// credentials are cleared whatever the server answers.
    pub async fn logout_with(&self, method: Method) -> Result<(), SessionError> {
        let outcome = match self.gateway.request(method, LOGOUT_PATH) {
            Ok(builder) => match self.gateway.send(builder).await {
                Ok(response) => error_for_status(response).await.map(|_| ()),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.session.store().clear();
        match &outcome {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!("Server logout failed, local session cleared anyway: {}", e),
        }
        outcome
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiMessage, SessionError> {
        self.gateway.send_json(Method::POST, REGISTER_PATH, request).await
    }

    pub async fn verify_register_otp(&self, request: &OtpVerifyRequest) -> Result<ApiMessage, SessionError> {
        self.gateway
            .send_json(Method::POST, REGISTER_OTP_VERIFY_PATH, request)
            .await
    }

    pub async fn verify_register_code(
        &self,
        request: &CodeVerifyRequest,
    ) -> Result<ApiMessage, SessionError> {
        self.gateway
            .send_json(Method::POST, REGISTER_CODE_VERIFY_PATH, request)
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiMessage, SessionError> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.gateway
            .send_json(Method::POST, PASSWORD_FORGOT_PATH, &request)
            .await
    }

    /// Changes the password of the logged-in account.
    pub async fn reset_password(&self, request: &ChangePasswordRequest) -> Result<ApiMessage, SessionError> {
        self.gateway
            .send_json(Method::POST, PASSWORD_RESET_PATH, request)
            .await
    }

    /// Sets a new password using the code mailed by `forgot_password`.
    pub async fn forgot_reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<ApiMessage, SessionError> {
        self.gateway
            .send_json(Method::POST, PASSWORD_FORGOT_RESET_PATH, request)
            .await
    }

    /// Confirms a reset with the one-off token from the reset link, sent as
    /// a bearer header rather than the session cookie.
    pub async fn confirm_password_reset(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<ApiMessage, SessionError> {
        let builder = self
            .gateway
            .request(Method::POST, PASSWORD_RESET_CONFIRM_PATH)?
            .header(AUTHORIZATION, bearer(reset_token))
            .json(&NewPasswordRequest {
                password: password.to_string(),
            });
        self.gateway.send_for_json(builder).await
    }
}
