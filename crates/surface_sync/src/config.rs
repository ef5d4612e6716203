//! Adapter configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Configuration trait with format-sniffing file load/save.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file. An unsupported
    /// extension is rejected before the file is touched.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") && !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Save configuration to a `.toml` or `.ron` file.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Tunables for a context driver instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    /// Requested present interval. 0 trades tearing resistance for latency.
    pub swap_interval: u32,
    /// How long `swap_buffers` idles when no presentable swapchain exists,
    /// in milliseconds.
    pub idle_wait_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            swap_interval: 1,
            idle_wait_ms: 10,
        }
    }
}

impl Config for DriverConfig {}

impl DriverConfig {
    /// The degraded-present idle wait as a `Duration`.
    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_driver_constants() {
        let config = DriverConfig::default();
        assert_eq!(config.swap_interval, 1);
        assert_eq!(config.idle_wait(), Duration::from_millis(10));
    }

    #[test]
    fn toml_round_trip() {
        let config = DriverConfig {
            swap_interval: 0,
            idle_wait_ms: 5,
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: DriverConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: DriverConfig = toml::from_str("swap_interval = 0").unwrap();
        assert_eq!(parsed.swap_interval, 0);
        assert_eq!(parsed.idle_wait_ms, 10);
    }

    #[test]
    fn unknown_extension_is_rejected_without_touching_the_file() {
        // The path does not exist; a read attempt would surface Io instead.
        assert!(matches!(
            DriverConfig::load_from_file("driver.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_with_known_extension_reports_io() {
        assert!(matches!(
            DriverConfig::load_from_file("does_not_exist.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
