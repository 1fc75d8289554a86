//! Config file lifecycle through `ConfigManager`

use hymnal_config::{apply_env_overrides, Config, ConfigManager, CONFIG_VERSION, ENV_DEFAULT_HOST};
use hymnal_core::RepeatMode;
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_init_edit_reset() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    assert!(manager.initialize()?);
    assert_eq!(manager.load()?, Config::default());

    manager.update(|config| {
        config.player.repeat_mode = RepeatMode::All;
        config.network.app_name = "chapel".to_string();
    })?;
    let edited = manager.load()?;
    assert_eq!(edited.player.repeat_mode, RepeatMode::All);
    assert_eq!(edited.network.app_name, "chapel");

    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());

    let backup = fs::read_to_string(manager.config_path().with_extension("toml.backup"))?;
    assert!(backup.contains("app_name = \"chapel\""));
    Ok(())
}

#[test]
fn test_directory_url_must_parse() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;
    assert!(manager.validate()?.is_empty());

    let mut invalid = Config::default();
    invalid.network.directory_url = "not a url".to_string();
    assert!(manager.save(&invalid).is_err());
    assert_eq!(manager.load()?, Config::default());
    Ok(())
}

#[test]
fn test_hand_edited_file_is_loaded_with_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        format!(
            "version = {}\n\n[network]\ndefault_host = \"https://[::1\"\n",
            CONFIG_VERSION
        ),
    )?;

    let config = manager.load()?;
    assert_eq!(config.network.default_host, "https://[::1");

    let errors = manager.validate()?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "network.default_host");
    Ok(())
}

#[test]
fn test_env_override_applies_over_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.update(|config| config.network.default_host = "https://file.example".to_string())?;

    let mut config = manager.load()?;
    apply_env_overrides(&mut config, |name| {
        (name == ENV_DEFAULT_HOST).then(|| "https://env.example".to_string())
    })?;

    assert_eq!(config.network.default_host, "https://env.example");
    assert_eq!(manager.load()?.network.default_host, "https://file.example");
    Ok(())
}

#[test]
fn test_v1_file_upgrades_on_load() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        "version = 1\n\n[player]\nui_refresh_ms = 25\nshuffle = true\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.player.progress_interval_ms, 25);
    assert!(config.player.shuffle);

    let raw = fs::read_to_string(manager.config_path())?;
    assert!(raw.contains(&format!("version = {}", CONFIG_VERSION)));
    assert_eq!(manager.load()?, config);
    Ok(())
}
