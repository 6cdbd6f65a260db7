//! # Configuration
//!
//! Runtime configuration for the plugin, loaded from TOML at startup and
//! read-only afterwards.
//!
//! The detection threshold and the reset interval are deliberately NOT here:
//! they are fixed constants of the heuristic (see the crate root), and
//! exposing them would invite operators to tune away its meaning.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VigilError, VigilResult};
use crate::DEFAULT_CHECK_INTERVAL_SECS;

/// Version of the configuration schema this build understands.
pub const CONFIG_VERSION: u32 = 1;

/// Plugin configuration.
///
/// Missing fields take their defaults, so an empty file is a valid (if
/// useless — the blacklist is empty) configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VigilConfig {
    /// Schema version the file was written for.
    ///
    /// Older files still load; a warning nudges the operator to update.
    pub version: u32,

    /// Restricted event names. A client holding an active listener for any
    /// of these is flagged.
    pub blacklist: HashSet<String>,

    /// Seconds between sweep ticks. Must be greater than zero.
    pub check_interval_secs: u64,
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            blacklist: HashSet::new(),
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
        }
    }
}

impl VigilConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::ConfigParse`] for malformed TOML and
    /// [`VigilError::InvalidConfig`] when validation fails.
    pub fn from_toml_str(raw: &str) -> VigilResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|err| VigilError::ConfigParse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::InvalidConfig`] when a field is out of range.
    pub fn validate(&self) -> VigilResult<()> {
        if self.check_interval_secs == 0 {
            return Err(VigilError::InvalidConfig(
                "check_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The sweep interval as a [`Duration`].
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Returns true if the file predates the current schema.
    #[must_use]
    pub const fn is_outdated(&self) -> bool {
        self.version < CONFIG_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VigilConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.blacklist.is_empty());
        assert_eq!(config.check_interval_secs, DEFAULT_CHECK_INTERVAL_SECS);
        assert!(config.validate().is_ok());
        assert!(!config.is_outdated());
    }

    #[test]
    fn test_parse_full_config() {
        let raw = r#"
            version = 1
            blacklist = ["player_hurt_internal", "round_prestart_raw"]
            check_interval_secs = 30
        "#;

        let config = VigilConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.check_interval_secs, 30);
        assert_eq!(config.check_interval(), Duration::from_secs(30));
        assert!(config.blacklist.contains("player_hurt_internal"));
        assert!(config.blacklist.contains("round_prestart_raw"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = VigilConfig::from_toml_str("").unwrap();
        assert_eq!(config, VigilConfig::default());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let raw = "check_interval_secs = 0";
        let err = VigilConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, VigilError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = VigilConfig::from_toml_str("blacklist = not-a-list").unwrap_err();
        assert!(matches!(err, VigilError::ConfigParse(_)));
    }

    #[test]
    fn test_outdated_version_detected() {
        let config = VigilConfig {
            version: 0,
            ..VigilConfig::default()
        };
        assert!(config.is_outdated());
        // Outdated is a warning, not an error.
        assert!(config.validate().is_ok());
    }
}
