//! Session persistence and token-expiry configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the persisted session under the data directory.
const STORAGE_FILE_NAME: &str = "auth-storage.json";

const fn default_expiry_buffer_secs() -> i64 {
    60
}

const fn default_refresh_window_secs() -> i64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Explicit path of the persisted session file. Empty means
    /// `<data dir>/vetdesk/auth-storage.json`.
    #[serde(default)]
    pub storage_path: String,

    /// A stored token is treated as expired this many seconds early.
    #[serde(default = "default_expiry_buffer_secs")]
    pub expiry_buffer_secs: i64,

    /// Window used by "expires soon" warnings.
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: String::new(),
            expiry_buffer_secs: default_expiry_buffer_secs(),
            refresh_window_secs: default_refresh_window_secs(),
        }
    }
}

impl SessionConfig {
    /// Resolve where the session file lives. `None` when no explicit path is
    /// set and the platform has no data directory.
    pub fn resolved_storage_path(&self) -> Option<PathBuf> {
        if !self.storage_path.trim().is_empty() {
            return Some(PathBuf::from(self.storage_path.trim()));
        }
        dirs::data_dir().map(|d| d.join("vetdesk").join(STORAGE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SessionConfig::default();
        assert!(config.storage_path.is_empty());
        assert_eq!(config.expiry_buffer_secs, 60);
        assert_eq!(config.refresh_window_secs, 300);
    }

    #[test]
    fn explicit_storage_path_wins() {
        let config = SessionConfig {
            storage_path: " /tmp/vetdesk/session.json ".into(),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_storage_path(),
            Some(PathBuf::from("/tmp/vetdesk/session.json"))
        );
    }

    #[test]
    fn default_storage_path_is_under_vetdesk_dir() {
        let config = SessionConfig::default();
        if let Some(path) = config.resolved_storage_path() {
            assert!(path.ends_with("vetdesk/auth-storage.json"));
        }
    }
}
