//! Remote API configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the clinic platform REST API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Check if the base URL looks usable.
    pub fn is_configured(&self) -> bool {
        let url = self.base_url.trim();
        url.starts_with("http://") || url.starts_with("https://")
    }

    /// Join an endpoint path (e.g. `"/auth/login"`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
