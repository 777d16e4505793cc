//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use fmg_config::HubConfig;

#[test]
fn loads_backend_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
url = "https://abcd.example.co"
anon_key = "anon-key"
service_role_key = "service-key"
request_timeout_ms = 5000
"#,
        )?;

        let config: HubConfig = Figment::from(Serialized::defaults(HubConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.backend.url, "https://abcd.example.co");
        assert_eq!(config.backend.anon_key, "anon-key");
        assert_eq!(config.backend.request_timeout_ms, 5000);
        assert!(config.backend.has_service_role());
        Ok(())
    });
}

#[test]
fn partial_session_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[session]
wake_debounce_ms = 500
"#,
        )?;

        let config: HubConfig = Figment::from(Serialized::defaults(HubConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.session.wake_debounce_ms, 500);
        assert_eq!(config.session.refresh_buffer_secs, 60);
        assert_eq!(config.session.auto_refresh_interval_secs, 30);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[zoom]
account_id = "toml-account"
client_id = "toml-id"
client_secret = "toml-secret"
"#,
        )?;
        jail.set_env("FMG_ZOOM__ACCOUNT_ID", "env-account");

        let config: HubConfig = Figment::from(Serialized::defaults(HubConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("FMG_").split("__"))
            .extract()?;

        assert_eq!(config.zoom.account_id, "env-account");
        assert_eq!(config.zoom.client_id, "toml-id");
        assert!(config.zoom.is_configured());
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".fmg")?;
        jail.create_file(
            ".fmg/config.toml",
            r#"
[server]
bind = "0.0.0.0:9000"
"#,
        )?;

        let config = HubConfig::load().expect("config loads");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        Ok(())
    });
}
