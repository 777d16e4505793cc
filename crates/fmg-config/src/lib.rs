//! # fmg-config
//!
//! Layered configuration loading for FMG Industry Hub using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FMG_*` prefix, `__` as separator)
//! 2. Project-level `.fmg/config.toml`
//! 3. User-level `~/.config/fmg-hub/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FMG_BACKEND__URL` -> `backend.url`, `FMG_ZOOM__ACCOUNT_ID` -> `zoom.account_id`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use fmg_config::HubConfig;
//!
//! let config = HubConfig::load_with_dotenv().expect("config");
//!
//! if config.backend.is_configured() {
//!     println!("Backend: {}", config.backend.rest_url());
//! }
//! ```

mod backend;
mod error;
mod google;
mod retry;
mod server;
mod session;
mod zoom;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use google::GoogleConfig;
pub use retry::RetrySettings;
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use zoom::ZoomConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HubConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
}

impl HubConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a
    /// value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".fmg/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("FMG_").split("__"))
    }

    /// Fail unless the sections the server needs are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] naming the first missing section,
    /// or [`ConfigError::InvalidValue`] for an unparseable bind address.
    pub fn require_server(&self) -> Result<(), ConfigError> {
        if !self.backend.has_service_role() {
            return Err(ConfigError::NotConfigured {
                section: "backend".into(),
            });
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "server.bind".into(),
                reason: format!("'{}' is not a socket address", self.server.bind),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fmg-hub").join("config.toml"))
    }

    /// Load `.env` from the workspace root, walking up from `CARGO_MANIFEST_DIR`
    /// (if set) before falling back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
