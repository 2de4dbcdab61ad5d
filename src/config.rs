//! User configuration for cutter.
//! An optional YAML file providing defaults that override the values
//! declared by templates.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::constants::{USER_CONFIG_ENV, USER_CONFIG_FILE};
use crate::context::Variables;
use crate::error::{CutterError, CutterResult, IoResultExt};

/// Settings read from the user configuration file.
///
/// ```yaml
/// default_context:
///   full_name: "Jane Doe"
///   email: "jane@example.com"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    /// Default-override layer applied on top of every template's declaration
    pub default_context: Variables,
}

/// Parses and validates a user configuration file.
///
/// # Errors
/// * `CutterError::ConfigError` if the file is not valid YAML of the expected shape
pub fn load_user_config<P: AsRef<Path>>(config_file: P) -> CutterResult<UserConfig> {
    let config_file = config_file.as_ref();
    debug!("Loading user configuration from {}", config_file.display());
    let content = fs::read_to_string(config_file).with_path(config_file)?;
    if content.trim().is_empty() {
        return Ok(UserConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|e| {
        CutterError::ConfigError(format!("invalid user config '{}': {e}", config_file.display()))
    })
}

/// Default location of the user configuration: `$CUTTER_CONFIG`, then
/// `~/.cutterrc`.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os(USER_CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(USER_CONFIG_FILE)))
}

/// Returns the user configuration.
///
/// An explicitly given file must exist. A missing file at the default
/// location yields an empty configuration.
pub fn get_user_config(config_file: Option<&Path>) -> CutterResult<UserConfig> {
    if let Some(config_file) = config_file {
        if !config_file.is_file() {
            return Err(CutterError::ConfigError(format!(
                "config file '{}' does not exist",
                config_file.display()
            )));
        }
        return load_user_config(config_file);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_user_config(path),
        _ => {
            debug!("No user configuration found, using defaults");
            Ok(UserConfig::default())
        }
    }
}
