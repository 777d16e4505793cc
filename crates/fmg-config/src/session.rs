//! Session liveness configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Refresh when the access token expires within this many seconds.
const fn default_refresh_buffer_secs() -> i64 {
    60
}

/// Wake events closer together than this collapse into one check.
const fn default_wake_debounce_ms() -> u64 {
    1_000
}

/// Period of the background auto-refresh timer.
const fn default_auto_refresh_interval_secs() -> u64 {
    30
}

const fn default_persist() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: i64,

    #[serde(default = "default_wake_debounce_ms")]
    pub wake_debounce_ms: u64,

    #[serde(default = "default_auto_refresh_interval_secs")]
    pub auto_refresh_interval_secs: u64,

    /// Whether sessions are written to the OS keychain / credentials file.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_buffer_secs: default_refresh_buffer_secs(),
            wake_debounce_ms: default_wake_debounce_ms(),
            auto_refresh_interval_secs: default_auto_refresh_interval_secs(),
            persist: default_persist(),
        }
    }
}

impl SessionConfig {
    pub const fn wake_debounce(&self) -> Duration {
        Duration::from_millis(self.wake_debounce_ms)
    }

    pub const fn auto_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_interval_secs)
    }
}
