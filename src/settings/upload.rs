//! Drive upload settings and the running upload statistics.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::JsonDocument;

pub const DEFAULT_ROOT_FOLDER: &str = "Scrollshot Photos";

/// How uploaded frames are arranged on Drive.
///
/// Any change to these fields invalidates the folder cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderLayout {
    /// Root folder name, or its id when `use_root_folder_id` is set.
    pub root_folder_name: String,
    pub use_root_folder_id: bool,
    pub create_date_folders: bool,
    pub create_channel_folders: bool,
    pub create_branch_folders: bool,
    pub use_custom_mapping: bool,
    /// Branch code -> Drive folder id.
    pub custom_folder_mapping: BTreeMap<String, String>,
}

impl Default for FolderLayout {
    fn default() -> Self {
        Self {
            root_folder_name: DEFAULT_ROOT_FOLDER.to_string(),
            use_root_folder_id: false,
            create_date_folders: true,
            create_channel_folders: true,
            create_branch_folders: true,
            use_custom_mapping: false,
            custom_folder_mapping: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadStats {
    pub total_uploaded: u64,
    pub total_failed: u64,
    /// Uploads since the worker last started.
    pub current_session: u64,
    pub last_upload_time: Option<DateTime<Local>>,
}

impl UploadStats {
    pub fn record_success(&mut self, at: DateTime<Local>) {
        self.total_uploaded += 1;
        self.current_session += 1;
        self.last_upload_time = Some(at);
    }

    pub fn record_failure(&mut self) {
        self.total_failed += 1;
    }

    pub fn begin_session(&mut self) {
        self.current_session = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Persisted as `upload_settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Enqueue frames for upload while capturing.
    pub auto_upload: bool,
    #[serde(flatten)]
    pub layout: FolderLayout,
    pub upload_stats: UploadStats,
}

impl JsonDocument for UploadSettings {
    fn after_load(&mut self) {
        self.upload_stats.begin_session();
    }
}
