//! Tests for configuration management module

use super::*;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.sounds_dir, PathBuf::from("sounds"));
    assert_eq!(settings.alsa_device, "default");
}

#[test]
fn test_settings_save_and_load() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config_path = dir.path().join("config.json");

    let mut settings = Settings::default();
    settings.sounds_dir = PathBuf::from("/usr/share/sonocli/sounds");
    settings.alsa_device = "plughw:1,0".to_string();

    settings.save(&config_path)?;
    let loaded = Settings::load(&config_path)?;

    assert_eq!(loaded.sounds_dir, PathBuf::from("/usr/share/sonocli/sounds"));
    assert_eq!(loaded.alsa_device, "plughw:1,0");
    Ok(())
}

#[test]
fn test_load_missing_file_returns_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let settings = Settings::load(&dir.path().join("nope.json"))?;
    assert_eq!(settings.alsa_device, "default");
    Ok(())
}

#[test]
fn test_validate_rejects_missing_sounds_dir() {
    let mut settings = Settings::default();
    settings.sounds_dir = PathBuf::from("/definitely/not/a/dir");
    assert!(settings.validate().is_err());
}

#[test]
fn test_validate_accepts_existing_dir() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut settings = Settings::default();
    settings.sounds_dir = dir.path().to_path_buf();
    settings.validate()?;
    Ok(())
}
