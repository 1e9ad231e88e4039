// Shared configuration helpers
//
// Layering: struct defaults, then a table from the optional TOML file, then
// environment variables (including a `.env` file).

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Deserialize `[section]` from a TOML file, or `T::default()` when the file
/// or the table is absent.
pub fn read_section<T>(file: Option<&Path>, section: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = file else {
        return Ok(T::default());
    };

    let text =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let table: toml::Table =
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    match table.get(section) {
        Some(value) => {
            debug!(path = %path.display(), section, "loaded config section");
            value
                .clone()
                .try_into()
                .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
        }
        None => Ok(T::default()),
    }
}

/// Parse an environment variable, logging a warning if the value is present but invalid.
pub fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`parse_env_var`] for optional settings
pub fn parse_env_opt<T: std::str::FromStr>(name: &str, default: Option<T>) -> Option<T> {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
