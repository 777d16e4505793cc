//! Client for the hosted auth service (GoTrue-compatible REST API).

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fmg_config::BackendConfig;
use serde::Deserialize;

use crate::error::AuthError;
use crate::session::{AuthUser, Session};

/// The auth operations the session store depends on.
///
/// Implemented by [`GoTrueClient`] in production and by in-memory fakes in tests.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchange an email and password for a session.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Exchange a refresh token for a new session.
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Revoke the session behind `access_token`.
    fn sign_out(&self, access_token: &str) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Resolve the user an access token belongs to.
    fn get_user(&self, access_token: &str) -> impl Future<Output = Result<AuthUser, AuthError>> + Send;
}

/// reqwest-backed [`AuthApi`].
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for AuthUser {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

impl GoTrueClient {
    /// Build a client for `auth_url` (e.g. `https://xyz.example.co/auth/v1`).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client cannot be constructed.
    pub fn new(auth_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from the `[backend]` config section using the anon key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client cannot be constructed.
    pub fn from_config(config: &BackendConfig) -> Result<Self, AuthError> {
        Self::new(
            config.auth_url(),
            config.anon_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/token?grant_type={grant_type}", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        Ok(resp.json().await?)
    }
}

impl AuthApi for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({ "email": email, "password": password });
        match self.token_grant("password", body).await {
            Ok(token) => session_from_token(token),
            Err(AuthError::Api { status: 400 | 401, message }) => {
                tracing::debug!(%message, "password grant rejected");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        match self.token_grant("refresh_token", body).await {
            Ok(token) => session_from_token(token),
            Err(AuthError::Api { status, message }) => {
                Err(AuthError::RefreshFailed(format!("{status}: {message}")))
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let resp = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        match check_response(resp).await {
            Ok(resp) => Ok(resp.json::<UserResponse>().await?.into()),
            Err(AuthError::Api { status: 401 | 403, .. }) => Err(AuthError::NotAuthenticated),
            Err(e) => Err(e),
        }
    }
}

fn session_from_token(token: TokenResponse) -> Result<Session, AuthError> {
    let expires_at = match (token.expires_at, token.expires_in) {
        (Some(at), _) => DateTime::from_timestamp(at, 0)
            .ok_or_else(|| AuthError::Other(format!("invalid expires_at: {at}")))?,
        (None, Some(secs)) => Utc::now() + chrono::TimeDelta::seconds(secs),
        (None, None) => crate::refresh::decode_expiry(&token.access_token)?,
    };
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
        user: token.user.into(),
    })
}

async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull the human-readable message out of an auth error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v[*k].as_str().map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}
