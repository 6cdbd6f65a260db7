//! # Configuration Loading
//!
//! Reads the plugin configuration from disk. A broken or missing file is a
//! warning, never a crash: the plugin keeps running on defaults.

use std::fs;
use std::path::Path;

use vigil_core::{VigilConfig, VigilError, VigilResult};

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`VigilError::ConfigIo`] when the file cannot be read,
/// [`VigilError::ConfigParse`] for malformed TOML, and
/// [`VigilError::InvalidConfig`] when validation fails.
pub fn load_config(path: impl AsRef<Path>) -> VigilResult<VigilConfig> {
    let raw = fs::read_to_string(path.as_ref())
        .map_err(|err| VigilError::ConfigIo(format!("{}: {err}", path.as_ref().display())))?;
    VigilConfig::from_toml_str(&raw)
}

/// Loads a configuration file, degrading to defaults with a warning.
#[must_use]
pub fn load_config_or_default(path: impl AsRef<Path>) -> VigilConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to load configuration ({err}); using defaults");
            VigilConfig::default()
        }
    }
}
