//! Capture loop settings and named presets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{JsonDocument, SettingsError};

/// Tunables of a capture session, persisted as `capture_settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Upper bound on capture attempts per session.
    pub shots: u32,
    /// Seconds to wait after each swipe.
    pub delay: f64,
    pub swipe_ms: u32,
    /// Fraction of the screen height where the swipe ends.
    pub padding_top: f64,
    /// Fraction of the screen height, from the bottom, where the swipe starts.
    pub padding_bottom: f64,
    /// Consecutive duplicate frames that end the session.
    pub overswipe: u32,
    pub tune: bool,
    pub continue_numbering: bool,
    pub output_dir: PathBuf,
    /// Renumber existing frames before a session starts.
    pub auto_sort: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            shots: 100,
            delay: 1.2,
            swipe_ms: 550,
            padding_top: 0.22,
            padding_bottom: 0.18,
            overswipe: 2,
            tune: false,
            continue_numbering: true,
            output_dir: PathBuf::from("shots"),
            auto_sort: true,
        }
    }
}

impl JsonDocument for CaptureSettings {}

impl CaptureSettings {
    /// Post-swipe delay. Negative or non-finite values become zero.
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// Duplicate limit, never below one.
    pub fn overswipe_limit(&self) -> u32 {
        self.overswipe.max(1)
    }
}

/// [`CaptureSettings`] without the output location, saved under a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturePreset {
    pub shots: u32,
    pub delay: f64,
    pub swipe_ms: u32,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub overswipe: u32,
    pub tune: bool,
    pub continue_numbering: bool,
}

impl Default for CapturePreset {
    fn default() -> Self {
        Self::from(&CaptureSettings::default())
    }
}

impl From<&CaptureSettings> for CapturePreset {
    fn from(s: &CaptureSettings) -> Self {
        Self {
            shots: s.shots,
            delay: s.delay,
            swipe_ms: s.swipe_ms,
            padding_top: s.padding_top,
            padding_bottom: s.padding_bottom,
            overswipe: s.overswipe,
            tune: s.tune,
            continue_numbering: s.continue_numbering,
        }
    }
}

impl JsonDocument for CapturePreset {}

impl CapturePreset {
    /// Overwrite the matching fields of `settings`.
    pub fn apply_to(&self, settings: &mut CaptureSettings) {
        settings.shots = self.shots;
        settings.delay = self.delay;
        settings.swipe_ms = self.swipe_ms;
        settings.padding_top = self.padding_top;
        settings.padding_bottom = self.padding_bottom;
        settings.overswipe = self.overswipe;
        settings.tune = self.tune;
        settings.continue_numbering = self.continue_numbering;
    }
}

/// Directory of `<name>.json` presets.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, SettingsError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SettingsError::InvalidPresetName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn save(&self, name: &str, preset: &CapturePreset) -> Result<PathBuf, SettingsError> {
        let path = self.path_for(name)?;
        preset.save(&path)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<CapturePreset, SettingsError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(SettingsError::PresetNotFound(name.to_string()));
        }
        CapturePreset::load(&path)
    }

    /// Names of stored presets, sorted.
    pub fn list(&self) -> Result<Vec<String>, SettingsError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SettingsError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }
}
