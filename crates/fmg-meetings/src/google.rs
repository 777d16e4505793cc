//! Google Calendar events with Meet conferences.
//!
//! Uses a stored OAuth refresh token for the studio calendar; each meeting is
//! a calendar event carrying a `hangoutsMeet` conference create-request.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use fmg_config::GoogleConfig;
use fmg_core::enums::MeetingProvider;
use fmg_core::responses::MeetingRequest;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::MeetingError;
use crate::token::{CachedToken, TokenResponse, error_message, form_body};
use crate::{MeetingScheduler, ScheduledMeeting, validate_request};

const PROVIDER: &str = "google";

pub struct GoogleMeetClient {
    http: reqwest::Client,
    config: GoogleConfig,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: String,
    #[serde(default)]
    hangout_link: Option<String>,
    #[serde(default)]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConferenceData {
    #[serde(default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryPoint {
    entry_point_type: String,
    uri: String,
}

impl EventResponse {
    fn join_url(self) -> Option<String> {
        self.hangout_link.or_else(|| {
            self.conference_data?
                .entry_points
                .into_iter()
                .find(|e| e.entry_point_type == "video")
                .map(|e| e.uri)
        })
    }
}

impl GoogleMeetClient {
    /// # Errors
    ///
    /// Returns `MeetingError::NotConfigured` without client credentials and a
    /// refresh token, or `MeetingError::Http` if the HTTP client cannot be built.
    pub fn new(config: GoogleConfig, timeout: Duration) -> Result<Self, MeetingError> {
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

    async fn access_token(&self) -> Result<String, MeetingError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let body = form_body(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", &self.config.refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ]);
        let resp = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
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
        tracing::debug!(expires_at = %token.expires_at, "google access token exchanged");
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

impl MeetingScheduler for GoogleMeetClient {
    fn provider(&self) -> MeetingProvider {
        MeetingProvider::GoogleMeet
    }

    async fn create_meeting(&self, request: &MeetingRequest) -> Result<ScheduledMeeting, MeetingError> {
        validate_request(request)?;
        let token = self.access_token().await?;

        let ends_at = request.starts_at + TimeDelta::minutes(i64::from(request.duration_minutes));
        let event = json!({
            "summary": request.topic.trim(),
            "start": { "dateTime": request.starts_at.to_rfc3339(), "timeZone": "UTC" },
            "end": { "dateTime": ends_at.to_rfc3339(), "timeZone": "UTC" },
            "conferenceData": {
                "createRequest": {
                    "requestId": format!("fmg-{}-{}", request.project_id, request.starts_at.timestamp()),
                    "conferenceSolutionKey": { "type": "hangoutsMeet" }
                }
            }
        });
        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.calendar_id)
        );
        let resp = self.http.post(url).bearer_auth(token).json(&event).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(MeetingError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        let created: EventResponse = resp.json().await?;
        let external_id = created.id.clone();
        let join_url = created.join_url().ok_or(MeetingError::MissingJoinUrl(PROVIDER))?;
        tracing::info!(project_id = %request.project_id, event_id = %external_id, "google meet created");
        Ok(ScheduledMeeting {
            provider: MeetingProvider::GoogleMeet,
            external_id,
            join_url,
        })
    }
}
