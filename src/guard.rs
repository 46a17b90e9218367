//! Route guard: decides whether a protected view may render.
//!
//! `Checking` → `Authorized` | `Unauthenticated` | `Forbidden`. Every check
//! starts from a fresh session query and fails closed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::Claims;
use crate::navigation::{Navigator, SESSION_EXPIRED_MESSAGE};
use crate::refresh::Refresher;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authorized(Claims),
    Unauthenticated,
    Forbidden,
}

impl GuardState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardState::Authorized(_))
    }
}

pub struct RouteGuard {
    session: Session,
    refresher: Arc<dyn Refresher>,
    navigator: Navigator,
    state: watch::Sender<GuardState>,
}

impl RouteGuard {
    pub fn new(session: Session, refresher: Arc<dyn Refresher>, navigator: Navigator) -> Self {
        let (state, _) = watch::channel(GuardState::Checking);
        Self {
            session,
            refresher,
            navigator,
            state,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    /// Observe transitions, e.g. to show a spinner while `Checking`.
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Runs one check. Call on mount and again whenever `required_roles`
    /// changes; an empty role set admits any authenticated user.
    pub async fn check<S: AsRef<str>>(&self, required_roles: &[S]) -> GuardState {
        self.state.send_replace(GuardState::Checking);

        let outcome = self.evaluate(required_roles).await;
        match &outcome {
            GuardState::Unauthenticated => {
                let message = self.session.has_token().then_some(SESSION_EXPIRED_MESSAGE);
                self.navigator.to_login(message);
            }
            GuardState::Forbidden => self.navigator.to_unauthorized(),
            GuardState::Authorized(claims) => {
                debug!("Route authorized for '{}' ({})", claims.subject, claims.role)
            }
            GuardState::Checking => {}
        }

        self.state.send_replace(outcome.clone());
        outcome
    }

    async fn evaluate<S: AsRef<str>>(&self, required_roles: &[S]) -> GuardState {
        if let Some(claims) = self.session.current_claims() {
            return authorize(claims, required_roles);
        }

        if !self.session.has_token() {
            debug!("No access token; not attempting refresh");
            return GuardState::Unauthenticated;
        }

        info!("Access token expired; attempting refresh before routing");
        match self.refresher.refresh().await {
            Ok(claims) => authorize(claims, required_roles),
            Err(e) => {
                warn!("Refresh during route check failed: {}", e);
                GuardState::Unauthenticated
            }
        }
    }
}

fn authorize<S: AsRef<str>>(claims: Claims, required_roles: &[S]) -> GuardState {
    if required_roles.is_empty() || claims.has_any_role(required_roles) {
        GuardState::Authorized(claims)
    } else {
        info!(
            "Role '{}' not in required roles {:?}",
            claims.role,
            required_roles.iter().map(AsRef::as_ref).collect::<Vec<_>>()
        );
        GuardState::Forbidden
    }
}
