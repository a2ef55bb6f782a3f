//! Browser configuration
//!
//! Configuration for the aggregation layer: cache capacities for glob
//! results and signatures, and the event channel capacity used by
//! observable collections.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main browser configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrowserConfig {
    /// Cache capacities
    #[serde(default)]
    pub cache: CacheConfig,

    /// Observable collection event settings
    #[serde(default)]
    pub events: EventConfig,
}

/// Capacities for the two result caches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached glob result collections
    pub glob_capacity: usize,

    /// Maximum number of cached service signatures. Signatures rarely
    /// change and are requested far more often than full globs, so this
    /// cache is much larger.
    pub signature_capacity: usize,
}

/// Event channel settings for observable collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Broadcast channel capacity per collection. Subscribers that lag
    /// past this many events fall back to snapshot reads.
    pub channel_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            glob_capacity: 100,
            signature_capacity: 10_000,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

impl BrowserConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: BrowserConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: BrowserConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.glob_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache: glob_capacity must be at least 1".to_string(),
            ));
        }

        if self.cache.signature_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache: signature_capacity must be at least 1".to_string(),
            ));
        }

        // Channel capacity must be reasonable (16-65536)
        if self.events.channel_capacity < 16 || self.events.channel_capacity > 65_536 {
            return Err(ConfigError::ValidationError(
                "events: channel_capacity must be between 16 and 65536".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BrowserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.glob_capacity, 100);
        assert_eq!(config.cache.signature_capacity, 10_000);
    }

    #[test]
    fn test_validate_zero_glob_capacity() {
        let mut config = BrowserConfig::default();
        config.cache.glob_capacity = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("glob_capacity must be at least 1"));
    }

    #[test]
    fn test_validate_channel_capacity_out_of_range() {
        let mut config = BrowserConfig::default();
        config.events.channel_capacity = 4;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("channel_capacity must be between"));
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            [cache]
            glob_capacity = 8
            signature_capacity = 64

            [events]
            channel_capacity = 128
        "#;

        let config = BrowserConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.cache.glob_capacity, 8);
        assert_eq!(config.cache.signature_capacity, 64);
        assert_eq!(config.events.channel_capacity, 128);
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let toml_str = r#"
            [cache]
            glob_capacity = 5
            signature_capacity = 10
        "#;

        let config = BrowserConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.cache.glob_capacity, 5);
        assert_eq!(config.events.channel_capacity, 1024);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = BrowserConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: BrowserConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.cache.glob_capacity, deserialized.cache.glob_capacity);
        assert_eq!(
            config.events.channel_capacity,
            deserialized.events.channel_capacity
        );
    }
}
