//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use sonocli::config::Settings;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        let sounds_dir = dir.path().join("sounds");
        std::fs::create_dir(&sounds_dir)?;

        // Create settings with test values
        let mut settings = Settings::default();
        settings.sounds_dir = sounds_dir.clone();
        settings.alsa_device = "test-audio-device".to_string();

        // Validate and save settings
        settings.validate()?;
        settings.save(&config_path)?;

        // Load settings back and verify they match what we saved
        let loaded_settings = Settings::load(&config_path)?;
        assert_eq!(loaded_settings.sounds_dir, sounds_dir);
        assert_eq!(loaded_settings.alsa_device, "test-audio-device");

        // Test overriding settings
        let mut updated_settings = loaded_settings;
        updated_settings.alsa_device = "hw:1,0".to_string();
        updated_settings.save(&config_path)?;

        // Load again and verify updates
        let reloaded_settings = Settings::load(&config_path)?;
        assert_eq!(reloaded_settings.alsa_device, "hw:1,0");

        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        // Empty ALSA device is rejected
        let invalid_settings = Settings {
            alsa_device: String::new(),
            ..Settings::default()
        };
        assert!(invalid_settings.validate().is_err());

        // A sounds directory that does not exist is rejected
        let missing_dir_settings = Settings {
            sounds_dir: "/definitely/not/a/real/sounds/dir".into(),
            ..Settings::default()
        };
        assert!(missing_dir_settings.validate().is_err());
    }

    /// Loading a missing config file falls back to defaults
    #[test]
    fn test_missing_config_uses_defaults() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let settings = Settings::load(&dir.path().join("nope.json"))?;
        assert_eq!(settings.alsa_device, Settings::default().alsa_device);
        assert_eq!(settings.sounds_dir, Settings::default().sounds_dir);
        Ok(())
    }
}
