//! Locating the config directory and layering environment overrides

use crate::app_config::LogLevel;
use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult, ValidationError};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::str::FromStr;

/// `app.log_level`
pub const ENV_LOG_LEVEL: &str = "HYMNAL_APP_LOG_LEVEL";
/// `network.app_name`
pub const ENV_APP_NAME: &str = "HYMNAL_NETWORK_APP_NAME";
/// `network.default_host`
pub const ENV_DEFAULT_HOST: &str = "HYMNAL_NETWORK_DEFAULT_HOST";
/// `player.load_timeout_secs`
pub const ENV_LOAD_TIMEOUT: &str = "HYMNAL_PLAYER_LOAD_TIMEOUT_SECS";

const FILE_NAME: &str = "config.toml";

/// Owns `<config dir>/config.toml` and the data directory next to it
///
/// The default directory is the platform's per-user config location for
/// `hymnal` (`~/.config/hymnal` on Linux).
pub struct ConfigManager {
    config_dir: PathBuf,
    file: ConfigFile,
}

impl ConfigManager {
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "hymnal").ok_or(ConfigError::NoConfigDir)?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        Ok(Self {
            file: ConfigFile::new(config_dir.join(FILE_NAME)),
            config_dir,
        })
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Playlist store directory; a relative `app.data_dir` hangs off the config dir
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.app.resolved_data_dir(&self.config_dir)
    }

    pub fn load(&self) -> ConfigResult<Config> {
        self.file.load()
    }

    /// Like `load`, but a broken file only costs a warning
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("{}; continuing with defaults", e);
            Config::default()
        })
    }

    /// Loads, then applies `HYMNAL_*` variables from the process environment
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        if let Err(errors) = config.validate() {
            log::warn!("After env overrides: {}", ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.save(config)
    }

    /// Read-modify-write; nothing is written if the result is invalid
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes the commented default file unless one is already there
    ///
    /// Returns whether a file was written.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.path().exists() {
            log::info!("Keeping existing {}", self.file.path().display());
            return Ok(false);
        }
        self.file.write_default()?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Field errors in the stored file; empty when it is valid
    pub fn validate(&self) -> ConfigResult<Vec<ValidationError>> {
        Ok(self.load()?.validate().err().unwrap_or_default())
    }
}

fn parse_override<T: FromStr>(variable: &str, raw: &str) -> ConfigResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            variable: variable.to_string(),
            value: raw.to_string(),
        })
}

/// Applies overrides read through `lookup`
///
/// Variables follow `HYMNAL_<SECTION>_<FIELD>`. A value that does not parse
/// is an error and leaves that field untouched.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_LOG_LEVEL) {
        config.app.log_level = parse_override::<LogLevel>(ENV_LOG_LEVEL, &raw)?;
    }
    if let Some(app_name) = lookup(ENV_APP_NAME) {
        config.network.app_name = app_name;
    }
    if let Some(host) = lookup(ENV_DEFAULT_HOST) {
        config.network.default_host = host;
    }
    if let Some(raw) = lookup(ENV_LOAD_TIMEOUT) {
        config.player.load_timeout_secs = parse_override(ENV_LOAD_TIMEOUT, &raw)?;
    }
    Ok(())
}
