//! Configuration file support for pipscout
//!
//! Reads configuration from `~/.config/pipscout/config.json`:
//!
//! ```json
//! {
//!   "index_url": "https://pypi.org/pypi",
//!   "thresholds": {
//!     "root_modules": 1,
//!     "dependency_modules": 3
//!   }
//! }
//! ```

use crate::python::{DEFAULT_INDEX_URL, Thresholds};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine config directory. HOME environment variable not set.")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of a PyPI-compatible JSON API
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Module-count thresholds for the requirements check
    #[serde(default)]
    pub thresholds: Thresholds,
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path or return defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }

    /// Replace the index URL when one is given on the command line
    pub fn with_index_url(mut self, index_url: Option<String>) -> Self {
        if let Some(url) = index_url {
            self.index_url = url;
        }
        self
    }
}

/// Returns the config file path: `~/.config/pipscout/config.json`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".config"))
                .unwrap_or_default()
        });

    if config_base.as_os_str().is_empty() {
        return Err(ConfigError::NoConfigDir);
    }

    Ok(config_base.join("pipscout").join("config.json"))
}
