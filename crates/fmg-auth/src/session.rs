//! In-memory session store with persistence and change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::api::AuthApi;
use crate::error::AuthError;
use crate::refresh::{EXPIRY_BUFFER_SECS, needs_refresh};
use crate::token_store::TokenStore;

const EVENT_CAPACITY: usize = 16;

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Seconds until the access token expires (negative once expired).
    #[must_use]
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    TokenRefreshed,
    SignedOut,
}

/// Owns the current session for one client.
///
/// Shared by `Arc`; every data-layer call reads its bearer token from here.
pub struct SessionManager<A: AuthApi> {
    api: A,
    session: RwLock<Option<Session>>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<AuthEvent>,
    store: Option<TokenStore>,
    refresh_buffer_secs: i64,
}

impl<A: AuthApi> SessionManager<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            events,
            store: None,
            refresh_buffer_secs: EXPIRY_BUFFER_SECS,
        }
    }

    /// Persist sessions through `store`.
    #[must_use]
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn with_refresh_buffer(mut self, secs: i64) -> Self {
        self.refresh_buffer_secs = secs;
        self
    }

    #[must_use]
    pub const fn refresh_buffer_secs(&self) -> i64 {
        self.refresh_buffer_secs
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Sign in and make the resulting session current.
    ///
    /// # Errors
    ///
    /// Propagates the auth API error (`InvalidCredentials` for a bad password).
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.api.sign_in_with_password(email, password).await?;
        let user = session.user.clone();
        self.install(session.clone()).await;
        tracing::info!(user_id = %user.id, "signed in");
        let _ = self.events.send(AuthEvent::SignedIn(user));
        Ok(session)
    }

    /// Load the persisted session, if any, and make it current.
    ///
    /// The restored token may be stale; the warmer refreshes it on the next wake.
    pub async fn restore(&self) -> Option<Session> {
        let session = self.store.as_ref()?.load()?;
        *self.session.write().await = Some(session.clone());
        tracing::debug!(user_id = %session.user.id, "restored persisted session");
        let _ = self.events.send(AuthEvent::SignedIn(session.user.clone()));
        Some(session)
    }

    /// Make `session` current without calling the auth API.
    pub async fn set_session(&self, session: Session) {
        let user = session.user.clone();
        self.install(session).await;
        let _ = self.events.send(AuthEvent::SignedIn(user));
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Bearer token of the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when signed out.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Whether there is no session or it expires within the refresh buffer.
    pub async fn needs_refresh(&self) -> bool {
        let expires_at = self.session.read().await.as_ref().map(|s| s.expires_at);
        needs_refresh(expires_at, Utc::now(), self.refresh_buffer_secs)
    }

    /// Exchange the refresh token for a new session.
    ///
    /// Single-flight: callers that queue behind an in-progress refresh get its
    /// result instead of spending the refresh token a second time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when there is no session, otherwise
    /// the auth API error. The session is left unchanged on error.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let seen = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone());
        let _guard = self.refresh_lock.lock().await;

        let current = self
            .session
            .read()
            .await
            .clone()
            .ok_or(AuthError::NotAuthenticated)?;
        if seen.as_deref() != Some(current.refresh_token.as_str()) {
            return Ok(current);
        }

        let fresh = self.api.refresh(&current.refresh_token).await?;
        self.install(fresh.clone()).await;
        tracing::debug!(expires_at = %fresh.expires_at, "session refreshed");
        let _ = self.events.send(AuthEvent::TokenRefreshed);
        Ok(fresh)
    }

    /// Clear the session locally and in the token store.
    ///
    /// Always ends signed out; a failed remote logout is only logged. Waits
    /// for an in-flight refresh so it cannot reinstall the session afterwards.
    pub async fn sign_out(&self) {
        let _guard = self.refresh_lock.lock().await;
        let previous = self.session.write().await.take();
        if let Some(session) = previous
            && let Err(error) = self.api.sign_out(&session.access_token).await
        {
            tracing::warn!(%error, "remote sign-out failed; local session cleared anyway");
        }
        if let Some(store) = &self.store
            && let Err(error) = store.clear()
        {
            tracing::warn!(%error, "failed to clear persisted session");
        }
        let _ = self.events.send(AuthEvent::SignedOut);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn install(&self, session: Session) {
        if let Some(store) = &self.store
            && let Err(error) = store.save(&session)
        {
            tracing::warn!(%error, "failed to persist session");
        }
        *self.session.write().await = Some(session);
    }
}
