//! Zoom (webinars) server-to-server OAuth configuration.

use serde::{Deserialize, Serialize};

fn default_api_base() -> String {
    String::from("https://api.zoom.us/v2")
}

fn default_oauth_base() -> String {
    String::from("https://zoom.us/oauth")
}

fn default_user_id() -> String {
    String::from("me")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoomConfig {
    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Host user the webinars are created under.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_oauth_base")]
    pub oauth_base: String,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            user_id: default_user_id(),
            api_base: default_api_base(),
            oauth_base: default_oauth_base(),
        }
    }
}

impl ZoomConfig {
    /// Check if the Zoom config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}
