//! Google Calendar (Meet links) configuration.

use serde::{Deserialize, Serialize};

fn default_calendar_id() -> String {
    String::from("primary")
}

fn default_api_base() -> String {
    String::from("https://www.googleapis.com/calendar/v3")
}

fn default_token_url() -> String {
    String::from("https://oauth2.googleapis.com/token")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleConfig {
    /// OAuth client ID.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,

    /// Long-lived refresh token of the studio calendar account.
    #[serde(default)]
    pub refresh_token: String,

    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            calendar_id: default_calendar_id(),
            api_base: default_api_base(),
            token_url: default_token_url(),
        }
    }
}

impl GoogleConfig {
    /// Check if the Google config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = GoogleConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.calendar_id, "primary");
    }

    #[test]
    fn not_configured_without_refresh_token() {
        let config = GoogleConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
