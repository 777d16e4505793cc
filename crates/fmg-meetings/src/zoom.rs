//! Zoom webinars via a server-to-server OAuth app.

use std::time::Duration;

use base64::Engine as _;
use chrono::{SecondsFormat, Utc};
use fmg_config::ZoomConfig;
use fmg_core::enums::MeetingProvider;
use fmg_core::responses::MeetingRequest;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::MeetingError;
use crate::token::{CachedToken, TokenResponse, error_message};
use crate::{MeetingScheduler, ScheduledMeeting, validate_request};

const PROVIDER: &str = "zoom";

/// Scheduled webinar (`type` 5 in the Zoom API).
const WEBINAR_TYPE: u8 = 5;

pub struct ZoomClient {
    http: reqwest::Client,
    config: ZoomConfig,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct WebinarResponse {
    id: serde_json::Value,
    #[serde(default)]
    join_url: Option<String>,
}

impl ZoomClient {
    /// # Errors
    ///
    /// Returns `MeetingError::NotConfigured` without account credentials, or
    /// `MeetingError::Http` if the HTTP client cannot be built.
    pub fn new(config: ZoomConfig, timeout: Duration) -> Result<Self, MeetingError> {
        if !config.is_configured() {
            return Err(MeetingError::NotConfigured(PROVIDER));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(pair)
        )
    }

    async fn access_token(&self) -> Result<String, MeetingError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let url = format!(
            "{}/token?grant_type=account_credentials&account_id={}",
            self.config.oauth_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.account_id)
        );
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(MeetingError::TokenExchange {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        let token = CachedToken::from_response(resp.json::<TokenResponse>().await?, now);
        tracing::debug!(expires_at = %token.expires_at, "zoom access token exchanged");
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

impl MeetingScheduler for ZoomClient {
    fn provider(&self) -> MeetingProvider {
        MeetingProvider::Zoom
    }

    async fn create_meeting(&self, request: &MeetingRequest) -> Result<ScheduledMeeting, MeetingError> {
        validate_request(request)?;
        let token = self.access_token().await?;

        let body = json!({
            "topic": request.topic.trim(),
            "type": WEBINAR_TYPE,
            "start_time": request.starts_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "duration": request.duration_minutes,
            "timezone": "UTC",
        });
        let url = format!(
            "{}/users/{}/webinars",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.user_id)
        );
        let resp = self.http.post(url).bearer_auth(token).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(MeetingError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        let created: WebinarResponse = resp.json().await?;
        let external_id = match created.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let join_url = created.join_url.ok_or(MeetingError::MissingJoinUrl(PROVIDER))?;
        tracing::info!(project_id = %request.project_id, webinar_id = %external_id, "zoom webinar created");
        Ok(ScheduledMeeting {
            provider: MeetingProvider::Zoom,
            external_id,
            join_url,
        })
    }
}
