//! Session wiring.
//!
//! Builds the cookie jar, HTTP client, credential store, refresher and
//! gateway from the configuration and ties them into a [`SessionKit`].

use std::sync::Arc;

use reqwest::cookie::Jar;
use tracing::info;

use crate::api::{AccountApi, AuthApi};
use crate::config::ConfigV1;
use crate::error::SessionError;
use crate::gateway::HttpGateway;
use crate::navigation::{AuthContext, Navigator};
use crate::refresh::RefreshClient;
use crate::session::Session;
use crate::state::SessionKit;
use crate::store::create_store;
use crate::utils::http_helpers::build_http_client;

/// Builds a [`SessionKit`] from `config`.
///
/// The store reads cookies from the same jar the HTTP client writes to, so
/// the access cookie the server sets is visible to session queries. The
/// initial auth flag reflects whatever session the store already holds.
///
/// # Errors
///
/// Returns [`SessionError::Config`] for an unusable base URL or when the
/// HTTP client cannot be built.
pub fn build(config: Arc<ConfigV1>) -> Result<SessionKit, SessionError> {
    let base_url = config.api.base_url()?;
    info!("Wiring session for {}", base_url);

    let jar = Arc::new(Jar::default());
    let http = build_http_client(jar.clone(), config.api.timeout())?;
    let store = create_store(&config.store, jar, &base_url);
    let session = Session::new(store.clone());

    let refresher = Arc::new(RefreshClient::new(http.clone(), &base_url, store)?);
    let navigator = Navigator::new(config.routes.clone());
    let gateway = Arc::new(HttpGateway::new(
        http,
        base_url,
        refresher.clone(),
        navigator.clone(),
    )?);
    let auth = AuthContext::new(session.is_authenticated());

    let auth_api = Arc::new(AuthApi::new(
        gateway.clone(),
        session.clone(),
        config.token_wait.clone(),
    ));
    let account_api = Arc::new(AccountApi::new(gateway.clone()));

    Ok(SessionKit {
        config,
        session,
        refresher,
        gateway,
        navigator,
        auth,
        auth_api,
        account_api,
    })
}
