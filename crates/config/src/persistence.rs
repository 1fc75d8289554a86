//! Reading and writing `config.toml`
//!
//! Loads go through the raw TOML table so older layouts can be migrated
//! before typed deserialization; a migrated file is rewritten on the spot.
//! Saves refuse invalid configs, keep the previous file as
//! `config.toml.backup` and replace the file atomically.

use crate::{Config, ConfigError, ConfigResult};
use hymnal_core::write_atomic;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEFAULT_HEADER: &str = "\
# Hymnal configuration
#
# [player] timings are in milliseconds except load_timeout_secs.
# repeat_mode is one of: off, one, all.
# Environment variables HYMNAL_<SECTION>_<FIELD> override values here.
";

/// The on-disk config file
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    /// Parses the file into a raw table, or `None` when it does not exist
    fn read_table(&self) -> ConfigResult<Option<toml::Table>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.path.clone(),
            });
        }

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads the config; a missing file yields defaults
    ///
    /// Values that fail validation are logged, not rejected, so a hand-edited
    /// file never locks the user out.
    pub fn load(&self) -> ConfigResult<Config> {
        let Some(mut table) = self.read_table()? else {
            log::info!("No config at {}, using defaults", self.path.display());
            return Ok(Config::default());
        };

        let migrated = crate::migration::migrate_to_latest(&mut table)?;
        let config: Config =
            toml::Value::Table(table)
                .try_into()
                .map_err(|source| ConfigError::Parse {
                    path: self.path.clone(),
                    source,
                })?;

        if migrated {
            if let Err(e) = self.save(&config) {
                log::warn!("Could not rewrite migrated config: {}", e);
            }
        }

        if let Err(errors) = config.validate() {
            log::warn!("{}", ConfigError::Invalid(errors));
        }

        Ok(config)
    }

    /// Writes a valid config, keeping the previous file as a backup
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;

        let body = toml::to_string_pretty(config)?;
        self.backup_existing()?;
        self.replace(body.as_bytes())?;

        log::info!("Config saved to {}", self.path.display());
        Ok(())
    }

    /// Writes the default config under a short explanatory header
    pub fn write_default(&self) -> ConfigResult<()> {
        let body = toml::to_string_pretty(&Config::default())?;
        self.replace(format!("{}\n{}", DEFAULT_HEADER, body).as_bytes())?;

        log::info!("Generated default config at {}", self.path.display());
        Ok(())
    }

    fn backup_existing(&self) -> ConfigResult<()> {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                log::debug!("Backed up config to {}", backup.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ConfigError::Write {
                path: backup,
                source,
            }),
        }
    }

    fn replace(&self, contents: &[u8]) -> ConfigResult<()> {
        write_atomic(&self.path, contents).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
