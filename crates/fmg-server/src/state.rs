//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fmg_auth::{AuthApi, GoTrueClient};
use fmg_backend::BackendClient;
use fmg_config::HubConfig;
use fmg_meetings::{GoogleMeetClient, ZoomClient};
use tokio::sync::Mutex;

/// State cloned into every handler.
///
/// `backend` runs with the service-role key; callers are identified through
/// `auth` from their bearer token. Meeting providers are optional so the
/// server still starts when one of them is not configured.
pub struct AppState<A = GoTrueClient> {
    pub backend: BackendClient,
    pub auth: Arc<A>,
    pub google: Option<Arc<GoogleMeetClient>>,
    pub zoom: Option<Arc<ZoomClient>>,
    pub max_body_bytes: usize,
    /// Serializes owner bootstrap within this process.
    pub bootstrap_lock: Arc<Mutex<()>>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            auth: Arc::clone(&self.auth),
            google: self.google.clone(),
            zoom: self.zoom.clone(),
            max_body_bytes: self.max_body_bytes,
            bootstrap_lock: Arc::clone(&self.bootstrap_lock),
        }
    }
}

impl<A: AuthApi> AppState<A> {
    pub fn new(backend: BackendClient, auth: A) -> Self {
        Self {
            backend,
            auth: Arc::new(auth),
            google: None,
            zoom: None,
            max_body_bytes: 1024 * 1024,
            bootstrap_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_google(mut self, client: GoogleMeetClient) -> Self {
        self.google = Some(Arc::new(client));
        self
    }

    #[must_use]
    pub fn with_zoom(mut self, client: ZoomClient) -> Self {
        self.zoom = Some(Arc::new(client));
        self
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl AppState<GoTrueClient> {
    /// Build the production state from a loaded config.
    ///
    /// # Errors
    ///
    /// Fails when the backend section lacks a service-role key or an HTTP
    /// client cannot be built.
    pub fn from_config(config: &HubConfig) -> anyhow::Result<Self> {
        let backend = BackendClient::service_role(&config.backend)
            .context("failed to build service-role backend client")?;
        let auth = GoTrueClient::from_config(&config.backend)
            .context("failed to build auth client")?;
        let timeout = Duration::from_millis(config.backend.request_timeout_ms);

        let mut state = Self::new(backend, auth).with_max_body_bytes(config.server.max_body_bytes);
        if config.google.is_configured() {
            state = state.with_google(
                GoogleMeetClient::new(config.google.clone(), timeout)
                    .context("failed to build Google client")?,
            );
        } else {
            tracing::warn!("google is not configured; /api/meetings/google will return 503");
        }
        if config.zoom.is_configured() {
            state = state.with_zoom(
                ZoomClient::new(config.zoom.clone(), timeout).context("failed to build Zoom client")?,
            );
        } else {
            tracing::warn!("zoom is not configured; /api/meetings/zoom will return 503");
        }
        Ok(state)
    }
}
