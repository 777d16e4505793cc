//! Hosted database-and-auth backend configuration.

use serde::{Deserialize, Serialize};

/// Default soft timeout for a single backend request, in milliseconds.
const fn default_request_timeout_ms() -> u64 {
    15_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Project URL (e.g., `https://abcd.example-backend.co`).
    #[serde(default)]
    pub url: String,

    /// Public anon key, sent as `apikey` on every request.
    #[serde(default)]
    pub anon_key: String,

    /// Service-role key. Server only; bypasses row-level security.
    #[serde(default)]
    pub service_role_key: String,

    /// Soft timeout applied to list queries.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            service_role_key: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields for client access.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    /// Check if the server-side service-role key is available.
    pub fn has_service_role(&self) -> bool {
        self.is_configured() && !self.service_role_key.is_empty()
    }

    /// Base URL of the REST (table) API.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base())
    }

    /// Base URL of the auth API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base())
    }

    /// Websocket URL of the realtime channel API.
    pub fn realtime_url(&self) -> String {
        let base = self.base();
        let ws = base
            .strip_prefix("https://")
            .map(|rest| format!("wss://{rest}"))
            .or_else(|| base.strip_prefix("http://").map(|rest| format!("ws://{rest}")))
            .unwrap_or_else(|| base.to_string());
        format!(
            "{ws}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.anon_key
        )
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
