//! JSON-backed configuration for populating records.
//!
//! The file lives in the standard configuration directory
//! (`~/.config/routebind/config.json` on most platforms) unless
//! `ROUTEBIND_CONFIG_PATH` or an explicit path says otherwise. Every setting
//! has a default, so a missing file is not an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the configuration file path.
pub const CONFIG_PATH_ENV: &str = "ROUTEBIND_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading or writing configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Settings consumed by the field populator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Delimiter used to split a single value into list items.
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: char,
    /// Keep empty items produced by splitting (`"a,,b"` gives three items instead of two).
    #[serde(default)]
    pub keep_empty_items: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            list_delimiter: default_list_delimiter(),
            keep_empty_items: false,
        }
    }
}

fn default_list_delimiter() -> char {
    ','
}

impl BindConfig {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults. A file that exists but cannot be parsed
    /// is logged and also yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        load_payload(&resolved_path)
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve the configuration file path, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routebind")
        .join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` (or `~/`, `~\`) to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let path = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if path == "~" {
        return home();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(path),
    }
}

fn load_payload(path: &Path) -> Result<BindConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded bind configuration");
                Ok(config)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(BindConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BindConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
