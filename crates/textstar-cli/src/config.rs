//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use textstar_hw::SerialSettings;

/// Display connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Serial port path
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate, must match the display setting
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Key poll timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Log rejected commands and transport errors as warnings
    #[serde(default)]
    pub diagnostics: bool,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    100
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Serial settings for opening the display.
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            baud_rate: self.baud,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            read_timeout_ms: default_read_timeout_ms(),
            diagnostics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.serial_settings(), SerialSettings::default());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("port = \"/dev/ttyAMA0\"\nbaud = 19200\n").unwrap();
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.baud, 19200);
        assert_eq!(config.read_timeout_ms, 100);
        assert!(!config.diagnostics);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textstar.toml");

        let config = Config {
            port: "/dev/ttyS1".to_string(),
            read_timeout_ms: 250,
            diagnostics: true,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.serial_settings().read_timeout,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }
}
