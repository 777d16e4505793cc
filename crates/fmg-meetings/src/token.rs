//! Provider access-token cache.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Re-exchange when fewer than this many seconds remain.
const EXPIRY_BUFFER_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

const fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn from_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            value: resp.access_token,
            expires_at: now + TimeDelta::seconds(resp.expires_in),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        (self.expires_at - now).num_seconds() > EXPIRY_BUFFER_SECS
    }
}

/// `application/x-www-form-urlencoded` body from key/value pairs.
pub(crate) fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Best-effort message from an OAuth or REST error body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["error_description"]
                .as_str()
                .or_else(|| v["error"]["message"].as_str())
                .or_else(|| v["message"].as_str())
                .or_else(|| v["reason"].as_str())
                .or_else(|| v["error"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}
