//! Background keep-warm for the access token.
//!
//! The poller lives only as long as its [`PollerHandle`]; dropping the handle
//! stops the timer. It never surfaces errors: a failed refresh of an expired
//! token only flips the shared [`AuthContext`] flag.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::codec::{self, now_seconds};
use crate::config::PollerConfig;
use crate::navigation::AuthContext;
use crate::refresh::Refresher;
use crate::store::CredentialStore;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    NoToken,
    Fresh,
    Refreshed,
    RefreshFailed,
}

pub struct SessionPoller {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn Refresher>,
    auth: AuthContext,
    interval: Duration,
    threshold_secs: i64,
}

impl SessionPoller {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn Refresher>,
        auth: AuthContext,
        config: &PollerConfig,
    ) -> Self {
        Self {
            store,
            refresher,
            auth,
            interval: Duration::from_secs(config.interval_secs.max(1)),
            threshold_secs: i64::try_from(config.threshold_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Inspects the token once and refreshes if it is expired or close to it.
    pub async fn tick(&self) -> PollOutcome {
        let Some(token) = self.store.access_token() else {
            debug!("Poller: no access token");
            return PollOutcome::NoToken;
        };

        // An undecodable token is as good as expired.
        let remaining = codec::decode(&token)
            .map(|claims| claims.seconds_until_expiry(now_seconds()))
            .unwrap_or(-1);

        if remaining < 0 {
            info!("Poller: access token expired, refreshing");
            return match self.refresher.refresh().await {
                Ok(_) => {
                    // Recovers a flag lowered by an earlier failed tick.
                    self.auth.set_authenticated(true);
                    PollOutcome::Refreshed
                }
                Err(e) => {
                    warn!("Poller: refresh of expired token failed: {}", e);
                    self.auth.set_authenticated(false);
                    PollOutcome::RefreshFailed
                }
            };
        }

        if remaining <= self.threshold_secs {
            info!("Poller: access token expires in {}s, refreshing early", remaining);
            return match self.refresher.refresh().await {
                Ok(_) => PollOutcome::Refreshed,
                Err(e) => {
                    warn!("Poller: proactive refresh failed: {}", e);
                    PollOutcome::RefreshFailed
                }
            };
        }

        debug!("Poller: access token valid for another {}s", remaining);
        PollOutcome::Fresh
    }

    /// Starts ticking on the current runtime until the handle is dropped.
    pub fn spawn(self) -> PollerHandle {
        let interval = self.interval;
        info!("Starting session poller every {:?}", interval);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        });
        PollerHandle { task }
    }
}

pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        debug!("Stopping session poller");
        self.task.abort();
    }
}
