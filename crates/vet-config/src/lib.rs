//! # vet-config
//!
//! Layered configuration loading for vetdesk using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VETDESK_*` prefix, `__` as separator)
//! 2. Project-level `.vetdesk/config.toml`
//! 3. User-level `~/.config/vetdesk/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VETDESK_API__BASE_URL` -> `api.base_url`,
//! `VETDESK_SESSION__EXPIRY_BUFFER_SECS` -> `session.expiry_buffer_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use vet_config::VetConfig;
//!
//! let config = VetConfig::load_with_dotenv().expect("config");
//! println!("API: {}", config.api.base_url);
//! ```

mod api;
mod error;
mod session;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use session::SessionConfig;

use chrono::TimeDelta;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VetConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl VetConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".vetdesk/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("VETDESK_").split("__"))
    }

    /// Reject values that would make the session layer misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.is_configured() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.api.base_url),
            });
        }
        check_seconds("session.expiry_buffer_secs", self.session.expiry_buffer_secs)?;
        check_seconds("session.refresh_window_secs", self.session.refresh_window_secs)?;
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vetdesk").join("config.toml"))
    }
}

fn check_seconds(field: &str, value: i64) -> Result<(), ConfigError> {
    let reason = if value < 0 {
        "must not be negative"
    } else if TimeDelta::try_seconds(value).is_none() {
        "is out of range for a duration"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = VetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.expiry_buffer_secs, 60);
    }

    #[test]
    fn negative_buffer_is_rejected() {
        let mut config = VetConfig::default();
        config.session.expiry_buffer_secs = -5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.expiry_buffer_secs"));
    }

    #[test]
    fn out_of_range_window_is_rejected() {
        let mut config = VetConfig::default();
        config.session.refresh_window_secs = i64::MAX / 100;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.refresh_window_secs"));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut config = VetConfig::default();
        config.api.base_url = "localhost".into();
        assert!(config.validate().is_err());
    }
}
