// crates/config/src/migration.rs
//! Configuration migration system
//!
//! Migrations run on the raw TOML table before it is deserialized, so keys
//! that no longer exist on `Config` can still be moved.

use crate::{ConfigError, ConfigResult, CONFIG_VERSION};

/// Version assumed for files written before the `version` key existed
pub const UNVERSIONED: u32 = 1;

/// One step in the upgrade chain
pub trait Migration {
    /// Returns the version this migration upgrades TO
    fn target_version(&self) -> u32;

    /// Performs the migration
    fn migrate(&self, value: &mut toml::Table) -> ConfigResult<()>;
}

/// Reads the stored format version
pub fn stored_version(value: &toml::Table) -> u32 {
    value
        .get("version")
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(UNVERSIONED)
}

/// Upgrades a raw config table to the latest version in place
///
/// Returns true if anything was migrated.
pub fn migrate_to_latest(value: &mut toml::Table) -> ConfigResult<bool> {
    let version = stored_version(value);

    if version == CONFIG_VERSION {
        return Ok(false);
    }

    if version > CONFIG_VERSION {
        log::warn!(
            "Config version {} is newer than supported version {}. Attempting to use as-is.",
            version,
            CONFIG_VERSION
        );
        return Ok(false);
    }

    log::info!(
        "Migrating config from version {} to {}",
        version,
        CONFIG_VERSION
    );

    let mut current_version = version;
    while current_version < CONFIG_VERSION {
        let next_version = current_version + 1;

        match get_migration(next_version) {
            Some(migration) => {
                debug_assert_eq!(migration.target_version(), next_version);
                migration.migrate(value)?;
                log::info!("Applied migration to version {}", next_version);
            }
            None => log::warn!(
                "No migration defined for version {}, skipping",
                next_version
            ),
        }

        current_version = next_version;
    }

    value.insert(
        "version".to_string(),
        toml::Value::Integer(i64::from(CONFIG_VERSION)),
    );

    Ok(true)
}

/// Returns the migration for a specific version, if one exists
fn get_migration(version: u32) -> Option<Box<dyn Migration>> {
    match version {
        2 => Some(Box::new(MigrationV2)),
        _ => None,
    }
}

/// Version 2 renamed `player.ui_refresh_ms` and `network.host`
struct MigrationV2;

impl Migration for MigrationV2 {
    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, value: &mut toml::Table) -> ConfigResult<()> {
        rename_key(value, "player", "ui_refresh_ms", "progress_interval_ms")?;
        rename_key(value, "network", "host", "default_host")?;
        Ok(())
    }
}

fn rename_key(value: &mut toml::Table, section: &str, from: &str, to: &str) -> ConfigResult<()> {
    let Some(section_value) = value.get_mut(section) else {
        return Ok(());
    };
    let table = section_value
        .as_table_mut()
        .ok_or_else(|| ConfigError::Migration {
            from: UNVERSIONED,
            reason: format!("[{}] is not a table", section),
        })?;

    if let Some(old) = table.remove(from) {
        if !table.contains_key(to) {
            table.insert(to.to_string(), old);
        }
    }
    Ok(())
}
