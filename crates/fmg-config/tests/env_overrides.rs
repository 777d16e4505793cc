use figment::Jail;
use fmg_config::HubConfig;

#[test]
fn env_vars_fill_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("FMG_BACKEND__URL", "https://env.example.co");
        jail.set_env("FMG_BACKEND__ANON_KEY", "env-anon");
        jail.set_env("FMG_GOOGLE__REFRESH_TOKEN", "1//refresh");

        let config = HubConfig::load().expect("config loads");
        assert_eq!(config.backend.url, "https://env.example.co");
        assert!(config.backend.is_configured());
        assert_eq!(config.google.refresh_token, "1//refresh");
        assert_eq!(config.google.calendar_id, "primary");
        Ok(())
    });
}

#[test]
fn numeric_env_values_are_parsed() {
    Jail::expect_with(|jail| {
        jail.set_env("FMG_SESSION__WAKE_DEBOUNCE_MS", "1500");
        jail.set_env("FMG_RETRY__MAX_ATTEMPTS", "2");

        let config = HubConfig::load().expect("config loads");
        assert_eq!(config.session.wake_debounce_ms, 1500);
        assert_eq!(config.retry.max_attempts, 2);
        Ok(())
    });
}

#[test]
fn malformed_numeric_env_value_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("FMG_SESSION__WAKE_DEBOUNCE_MS", "soon");
        assert!(HubConfig::load().is_err());
        Ok(())
    });
}
