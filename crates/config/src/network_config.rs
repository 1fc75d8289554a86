//! Network configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoints and request settings for track resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Directory listing discovery hosts
    pub directory_url: String,

    /// Host used when the directory is unreachable or empty
    pub default_host: String,

    /// Value of the `app_name` query parameter
    pub app_name: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            directory_url: "https://api.audius.co".to_string(),
            default_host: "https://audius-discovery-3.altego.net".to_string(),
            app_name: "hymnal".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ConfigSection for NetworkConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::http_url(&self.directory_url, "network.directory_url"),
            Validator::http_url(&self.default_host, "network.default_host"),
            Validator::not_empty(&self.app_name, "network.app_name"),
            Validator::in_range(
                self.request_timeout_secs,
                1,
                120,
                "network.request_timeout_secs",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.directory_url = other.directory_url;
        self.default_host = other.default_host;
        self.app_name = other.app_name;
        self.request_timeout_secs = other.request_timeout_secs;
    }

    fn section_name(&self) -> &'static str {
        "network"
    }
}
