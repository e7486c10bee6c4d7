//! Configuration file handling for scrollshot.
//!
//! Loads configuration from `~/.config/scrollshot/config.toml` or a custom path.
//! The file only carries deployment concerns (where state lives, how to reach
//! `adb` and Drive). Capture tunables live in the JSON settings documents.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::drive::auth::DRIVE_TOKEN_ENV;
use crate::drive::client::{DRIVE_API_BASE_URL, DRIVE_UPLOAD_BASE_URL};

/// Configuration file structure for scrollshot.
/// Loaded from ~/.config/scrollshot/config.toml (or custom path via --config).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub drive: DriveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PathsConfig {
    /// Directory holding channels.json, capture_settings.json and friends.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_adb")]
    pub adb: String,
    /// Device serial used when --serial is not given.
    #[serde(default)]
    pub serial: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb: default_adb(),
            serial: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    /// Environment variable holding the OAuth access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            token_env: default_token_env(),
        }
    }
}

fn default_adb() -> String {
    "adb".to_string()
}

fn default_api_base_url() -> String {
    DRIVE_API_BASE_URL.to_string()
}

fn default_upload_base_url() -> String {
    DRIVE_UPLOAD_BASE_URL.to_string()
}

fn default_token_env() -> String {
    DRIVE_TOKEN_ENV.to_string()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Directory for the JSON settings documents.
    ///
    /// Falls back to the platform data dir, then `./.scrollshot`.
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("scrollshot")))
            .unwrap_or_else(|| PathBuf::from(".scrollshot"))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to access config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError { path, source } => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("scrollshot").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/scrollshot/config.toml")
        })
}
