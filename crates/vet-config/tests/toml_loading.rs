//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed cwd and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use vet_config::VetConfig;

#[test]
fn loads_api_and_session_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "https://api.clinic.test/v2"
timeout_secs = 5

[session]
storage_path = "/var/lib/vetdesk/auth-storage.json"
expiry_buffer_secs = 120
"#,
        )?;

        let config: VetConfig = Figment::from(Serialized::defaults(VetConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.api.base_url, "https://api.clinic.test/v2");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.session.storage_path,
            "/var/lib/vetdesk/auth-storage.json"
        );
        assert_eq!(config.session.expiry_buffer_secs, 120);
        assert_eq!(config.session.refresh_window_secs, 300);
        Ok(())
    });
}

#[test]
fn env_overrides_toml_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "https://from-toml.test"
"#,
        )?;
        jail.set_env("VETDESK_API__BASE_URL", "https://from-env.test");

        let config: VetConfig = Figment::from(Serialized::defaults(VetConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("VETDESK_").split("__"))
            .extract()?;

        assert_eq!(config.api.base_url, "https://from-env.test");
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".vetdesk")?;
        jail.create_file(
            ".vetdesk/config.toml",
            r#"
[session]
refresh_window_secs = 900
"#,
        )?;

        let config = VetConfig::load().expect("config loads");
        assert_eq!(config.session.refresh_window_secs, 900);
        Ok(())
    });
}

#[test]
fn load_rejects_invalid_base_url() {
    Jail::expect_with(|jail| {
        jail.set_env("VETDESK_API__BASE_URL", "ftp://nope");
        assert!(VetConfig::load().is_err());
        Ok(())
    });
}
