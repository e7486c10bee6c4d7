//! Persisted application state.
//!
//! Each document is a small JSON file read and written wholesale. There is no
//! schema version; missing fields take their defaults so older files keep
//! loading.

pub mod capture;
pub mod channels;
pub mod upload;

pub use capture::{CapturePreset, CaptureSettings, PresetStore};
pub use channels::{channel_short, BranchChange, Channel, ChannelRegistry};
pub use upload::{FolderLayout, UploadSettings, UploadStats};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Errors from reading, writing or editing persisted settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("Branch '{branch}' is not part of channel '{channel}'")]
    UnknownBranch { channel: String, branch: String },

    #[error("Channel '{0}' already exists")]
    ChannelExists(String),

    #[error("Invalid preset name '{0}' (use letters, digits, '-' or '_')")]
    InvalidPresetName(String),

    #[error("Preset '{0}' not found")]
    PresetNotFound(String),
}

/// A settings document stored as pretty-printed JSON.
pub trait JsonDocument: Serialize + DeserializeOwned + Default {
    /// Hook run after a successful load.
    fn after_load(&mut self) {}

    /// Read the document at `path`. An absent file yields the default.
    fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut doc: Self = serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        doc.after_load();
        Ok(doc)
    }

    /// Like [`JsonDocument::load`], but malformed files fall back to the default
    /// with a warning.
    fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Write the document, creating parent directories as needed.
    fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(io_err)
    }
}

/// Locations of the settings documents inside the data directory.
#[derive(Debug, Clone)]
pub struct SettingsPaths {
    data_dir: PathBuf,
}

impl SettingsPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn channels(&self) -> PathBuf {
        self.data_dir.join("channels.json")
    }

    pub fn capture(&self) -> PathBuf {
        self.data_dir.join("capture_settings.json")
    }

    pub fn upload(&self) -> PathBuf {
        self.data_dir.join("upload_settings.json")
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.data_dir.join("presets")
    }
}
