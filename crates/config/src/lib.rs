//! Hymnal configuration
//!
//! A TOML file with one table per concern (`[app]`, `[player]`, `[network]`).
//! Each section implements `ConfigSection` for validation and merging.
//! Invalid files are warned about on load and refused on save; missing
//! files fall back to defaults; old layouts are migrated in place.
//!
//! ```rust,no_run
//! use hymnal_config::ConfigManager;
//!
//! # fn main() -> hymnal_config::ConfigResult<()> {
//! let manager = ConfigManager::new()?;
//! let config = manager.load_with_env_overrides()?;
//! println!("resolving through {}", config.network.default_host);
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
mod migration;
mod persistence;
mod validation;

pub mod app_config;
mod network_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{
    apply_env_overrides, ConfigManager, ENV_APP_NAME, ENV_DEFAULT_HOST, ENV_LOAD_TIMEOUT,
    ENV_LOG_LEVEL,
};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use network_config::NetworkConfig;
pub use player_config::PlayerConfig;

use serde::{Deserialize, Serialize};

/// Layout version written to new files; older files are migrated on load
pub const CONFIG_VERSION: u32 = 2;

/// Contents of `config.toml`; missing keys take their defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub app: AppConfig,
    /// Playback timing and session defaults
    pub player: PlayerConfig,
    /// Resolution endpoints
    pub network: NetworkConfig,
}

impl Config {
    /// Every failing field across all sections, in file order
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [
            self.app.validate(),
            self.player.validate(),
            self.network.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .flatten()
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Section-wise merge; `other` wins
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
        self.network.merge(other.network);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
