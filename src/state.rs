//! Shared session state.
//!
//! Everything a front end needs to keep a session alive, wired once at
//! startup and cloned into whatever consumes it.

use std::sync::Arc;

use crate::api::{AccountApi, AuthApi};
use crate::config::ConfigV1;
use crate::gateway::HttpGateway;
use crate::guard::RouteGuard;
use crate::navigation::{AuthContext, Navigator};
use crate::poller::SessionPoller;
use crate::refresh::RefreshClient;
use crate::session::Session;

#[derive(Clone)]
pub struct SessionKit {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Read-only session queries over the credential store.
    pub session: Session,
    pub refresher: Arc<RefreshClient>,
    /// Outbound request pipeline with refresh-and-retry.
    pub gateway: Arc<HttpGateway>,
    pub navigator: Navigator,
    pub auth: AuthContext,
    pub auth_api: Arc<AuthApi>,
    pub account_api: Arc<AccountApi>,
}

impl SessionKit {
    /// A fresh guard for one protected view.
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(
            self.session.clone(),
            self.refresher.clone(),
            self.navigator.clone(),
        )
    }

    /// A poller bound to this kit's store and auth flag. Not started.
    pub fn poller(&self) -> SessionPoller {
        SessionPoller::new(
            self.session.store().clone(),
            self.refresher.clone(),
            self.auth.clone(),
            &self.config.poller,
        )
    }
}
