//! Typed navigation outcomes and the shared auth flag.
//!
//! The gateway and the route guard never navigate themselves; they report a
//! [`Redirect`] and a single top-level listener acts on it.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::RoutesConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Session missing or unrecoverable. `message` is carried to the login view.
    Login { path: String, message: Option<String> },
    /// Authenticated but lacking the required role.
    Unauthorized { path: String },
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Clone)]
pub struct Navigator {
    routes: RoutesConfig,
    tx: broadcast::Sender<Redirect>,
}

impl Navigator {
    pub fn new(routes: RoutesConfig) -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { routes, tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Redirect> {
        self.tx.subscribe()
    }

    pub fn to_login(&self, message: Option<&str>) {
        self.emit(Redirect::Login {
            path: self.routes.login_path.clone(),
            message: message.map(str::to_string),
        });
    }

    pub fn to_unauthorized(&self) {
        self.emit(Redirect::Unauthorized {
            path: self.routes.unauthorized_path.clone(),
        });
    }

    fn emit(&self, redirect: Redirect) {
        info!("Redirect requested: {:?}", redirect);
        // No listener yet is not an error.
        if self.tx.send(redirect).is_err() {
            debug!("No navigation listener attached");
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RoutesConfig::default())
    }
}

/// The "authenticated" flag consumers observe. The poller only ever flips
/// it; it never redirects.
#[derive(Clone)]
pub struct AuthContext {
    tx: Arc<watch::Sender<bool>>,
}

impl AuthContext {
    pub fn new(authenticated: bool) -> Self {
        let (tx, _) = watch::channel(authenticated);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.tx.send_if_modified(|current| {
            if *current == authenticated {
                return false;
            }
            info!("Auth context changed: authenticated={}", authenticated);
            *current = authenticated;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigator_delivers_to_listener() {
        let nav = Navigator::default();
        let mut rx = nav.subscribe();
        nav.to_login(Some(SESSION_EXPIRED_MESSAGE));
        nav.to_unauthorized();

        assert_eq!(
            rx.recv().await.unwrap(),
            Redirect::Login {
                path: "/login".into(),
                message: Some(SESSION_EXPIRED_MESSAGE.into())
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            Redirect::Unauthorized {
                path: "/unauthorized".into()
            }
        );
    }

    #[test]
    fn test_navigator_without_listener_is_silent() {
        Navigator::default().to_login(None);
    }

    #[tokio::test]
    async fn test_auth_context_notifies_only_on_change() {
        let ctx = AuthContext::new(true);
        let mut rx = ctx.subscribe();
        ctx.set_authenticated(true);
        assert!(!rx.has_changed().unwrap());
        ctx.set_authenticated(false);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_auth_context_clones_share_one_flag() {
        let ctx = AuthContext::new(false);
        let poller_side = ctx.clone();
        let mut rx = ctx.subscribe();
        poller_side.set_authenticated(true);
        assert!(ctx.is_authenticated());
        assert!(rx.has_changed().unwrap());
    }
}
