//! Keeps the bearer token fresh ahead of API calls.
//!
//! A check reads the current expiry and refreshes when fewer than
//! `buffer_secs` remain. A refresh failure always ends in a forced sign-out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::AuthApi;
use crate::error::AuthError;
use crate::refresh::needs_refresh;
use crate::session::SessionManager;

/// What the warmer needs from a session holder.
pub trait SessionSource: Send + Sync + 'static {
    /// Expiry of the current session, `None` when signed out.
    fn expires_at(&self) -> impl Future<Output = Option<DateTime<Utc>>> + Send;

    fn refresh_session(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn force_sign_out(&self) -> impl Future<Output = ()> + Send;
}

impl<A: AuthApi> SessionSource for SessionManager<A> {
    async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current().await.map(|s| s.expires_at)
    }

    async fn refresh_session(&self) -> Result<(), AuthError> {
        self.refresh().await.map(|_| ())
    }

    async fn force_sign_out(&self) {
        self.sign_out().await;
    }
}

/// Result of one warm check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmOutcome {
    /// Token had more than the buffer left; nothing was sent.
    Fresh,
    Refreshed,
    /// Refresh failed (or there was nothing to refresh) and the session was cleared.
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarmPhase {
    #[default]
    Idle,
    Checking,
}

/// Published after every phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WarmStatus {
    pub phase: WarmPhase,
    pub last: Option<WarmOutcome>,
}

pub struct SessionWarmer<S> {
    source: Arc<S>,
    buffer_secs: i64,
    status: watch::Sender<WarmStatus>,
}

impl<S: SessionSource> SessionWarmer<S> {
    #[must_use]
    pub fn new(source: Arc<S>, buffer_secs: i64) -> Self {
        let (status, _) = watch::channel(WarmStatus::default());
        Self {
            source,
            buffer_secs,
            status,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Refresh the session if it is missing, expired, or inside the buffer.
    ///
    /// Never fails: refresh errors are logged and turned into a sign-out.
    pub async fn warm_if_needed(&self) -> WarmOutcome {
        self.status.send_modify(|s| s.phase = WarmPhase::Checking);

        let expires_at = self.source.expires_at().await;
        let outcome = if needs_refresh(expires_at, Utc::now(), self.buffer_secs) {
            match self.source.refresh_session().await {
                Ok(()) => WarmOutcome::Refreshed,
                Err(error) => {
                    tracing::warn!(%error, "session refresh failed; signing out");
                    self.source.force_sign_out().await;
                    WarmOutcome::SignedOut
                }
            }
        } else {
            WarmOutcome::Fresh
        };

        tracing::debug!(?outcome, "session warm check");
        self.status.send_replace(WarmStatus {
            phase: WarmPhase::Idle,
            last: Some(outcome),
        });
        outcome
    }

    #[must_use]
    pub fn status(&self) -> watch::Receiver<WarmStatus> {
        self.status.subscribe()
    }

    /// Warm the session every `interval` until the returned task is aborted.
    ///
    /// Ticks with no session are skipped so a signed-out client stays quiet.
    pub fn spawn_auto_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let warmer = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; wake handling covers startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if warmer.source.expires_at().await.is_none() {
                    continue;
                }
                warmer.warm_if_needed().await;
            }
        })
    }
}
