//! Shared fakes for integration tests: a scripted device and an in-memory Drive.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scrollshot::capture::StopSignal;
use scrollshot::device::{DeviceBridge, DeviceError, ScreenSize, Swipe};
use scrollshot::drive::{
    Authenticator, DriveBackend, DriveError, EntryKind, EntryQuery, RemoteEntry,
};

// === Device ===

/// Device whose screenshots are a fixed script of byte strings.
///
/// Once the script runs out, the last frame repeats (the end of a list).
pub struct FakeBridge {
    frames: Mutex<VecDeque<Vec<u8>>>,
    last: Mutex<Vec<u8>>,
    captures: AtomicUsize,
    swipes: Mutex<Vec<Swipe>>,
    tuned: AtomicUsize,
    screen: ScreenSize,
    devices: Vec<String>,
    fail_capture_at: Option<usize>,
    fail_swipe_at: Option<usize>,
    stop_after: Option<(usize, StopSignal)>,
}

impl FakeBridge {
    pub fn new(frames: &[&[u8]]) -> Self {
        Self {
            frames: Mutex::new(frames.iter().map(|f| f.to_vec()).collect()),
            last: Mutex::new(b"blank".to_vec()),
            captures: AtomicUsize::new(0),
            swipes: Mutex::new(Vec::new()),
            tuned: AtomicUsize::new(0),
            screen: ScreenSize {
                width: 1080,
                height: 2400,
            },
            devices: vec!["emulator-5554".to_string()],
            fail_capture_at: None,
            fail_swipe_at: None,
            stop_after: None,
        }
    }

    /// `count` pairwise distinct frames.
    pub fn distinct(count: usize) -> Self {
        let frames: Vec<Vec<u8>> = (0..count).map(|i| format!("frame-{}", i).into_bytes()).collect();
        let refs: Vec<&[u8]> = frames.iter().map(Vec::as_slice).collect();
        Self::new(&refs)
    }

    /// Fail the `n`th capture (1-based).
    pub fn failing_capture_at(mut self, n: usize) -> Self {
        self.fail_capture_at = Some(n);
        self
    }

    /// Fail the `n`th swipe (1-based).
    pub fn failing_swipe_at(mut self, n: usize) -> Self {
        self.fail_swipe_at = Some(n);
        self
    }

    /// Raise `signal` right after the `n`th capture.
    pub fn triggering_stop_after(mut self, n: usize, signal: StopSignal) -> Self {
        self.stop_after = Some((n, signal));
        self
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn swipes(&self) -> Vec<Swipe> {
        self.swipes.lock().unwrap().clone()
    }

    pub fn tune_calls(&self) -> usize {
        self.tuned.load(Ordering::SeqCst)
    }
}

impl DeviceBridge for FakeBridge {
    fn list_devices(&self) -> Result<Vec<String>, DeviceError> {
        Ok(self.devices.clone())
    }

    fn screen_size(&self, _serial: &str) -> Result<ScreenSize, DeviceError> {
        Ok(self.screen)
    }

    fn capture_to_file(&self, _serial: &str, path: &Path) -> Result<(), DeviceError> {
        let n = self.captures.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_capture_at == Some(n) {
            return Err(DeviceError::EmptyCapture);
        }

        let bytes = match self.frames.lock().unwrap().pop_front() {
            Some(bytes) => {
                *self.last.lock().unwrap() = bytes.clone();
                bytes
            }
            None => self.last.lock().unwrap().clone(),
        };
        std::fs::write(path, bytes).map_err(|e| DeviceError::Io {
            path: Some(path.to_path_buf()),
            source: e,
        })?;

        if let Some((after, signal)) = &self.stop_after {
            if n == *after {
                signal.trigger();
            }
        }
        Ok(())
    }

    fn swipe(&self, _serial: &str, swipe: &Swipe) -> Result<(), DeviceError> {
        let mut swipes = self.swipes.lock().unwrap();
        swipes.push(*swipe);
        if self.fail_swipe_at == Some(swipes.len()) {
            return Err(DeviceError::CommandFailed {
                command: "input swipe".to_string(),
                status: Some(1),
                stderr: "device offline".to_string(),
            });
        }
        Ok(())
    }

    fn tune(&self, _serial: &str) {
        self.tuned.fetch_add(1, Ordering::SeqCst);
    }
}

// === Drive ===

#[derive(Debug, Clone)]
struct StoredEntry {
    id: String,
    name: String,
    parent: Option<String>,
    folder: bool,
    bytes: Vec<u8>,
}

/// Counts of backend calls, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_entries: usize,
    pub create_folder: usize,
    pub create_file: usize,
    pub folder_exists: usize,
}

impl CallCounts {
    /// Calls that walk or build the folder hierarchy.
    pub fn hierarchy_calls(&self) -> usize {
        self.list_entries + self.create_folder
    }
}

#[derive(Default)]
struct DriveState {
    next_id: usize,
    entries: Vec<StoredEntry>,
    calls: CallCounts,
    fail_uploads: bool,
    upload_delay: Duration,
}

/// In-memory Drive. Parent `None` is the top of My Drive.
#[derive(Default)]
pub struct MemoryDrive {
    state: Mutex<DriveState>,
}

impl MemoryDrive {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn insert(&self, name: &str, parent: Option<&str>, folder: bool, bytes: Vec<u8>) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{}-{}", if folder { "folder" } else { "file" }, state.next_id);
        state.entries.push(StoredEntry {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.map(str::to_string),
            folder,
            bytes,
        });
        id
    }

    /// Seed a folder without counting a call.
    pub fn add_folder(&self, name: &str, parent: Option<&str>) -> String {
        self.insert(name, parent, true, Vec::new())
    }

    /// Seed a file without counting a call.
    pub fn add_file(&self, name: &str, parent: &str) -> String {
        self.insert(name, Some(parent), false, Vec::new())
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls = CallCounts::default();
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.state.lock().unwrap().fail_uploads = fail;
    }

    pub fn set_upload_delay(&self, delay: Duration) {
        self.state.lock().unwrap().upload_delay = delay;
    }

    /// Names of files (not folders) directly in `parent`.
    pub fn file_names_in(&self, parent: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| !e.folder && e.parent.as_deref() == Some(parent))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Every file, as (name, parent id).
    pub fn all_files(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| !e.folder)
            .map(|e| (e.name.clone(), e.parent.clone().unwrap_or_default()))
            .collect()
    }

    pub fn file_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| !e.folder && e.name == name)
            .map(|e| e.bytes.clone())
    }

    /// Ids of folders named `name` under `parent`.
    pub fn folders_named(&self, name: &str, parent: Option<&str>) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.folder && e.name == name && e.parent.as_deref() == parent)
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn folder_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.folder)
            .count()
    }
}

#[async_trait]
impl DriveBackend for MemoryDrive {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<RemoteEntry>, DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_entries += 1;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.parent == query.parent)
            .filter(|e| query.name.as_deref().map_or(true, |n| n == e.name))
            .filter(|e| query.kind == EntryKind::Any || e.folder)
            .map(|e| RemoteEntry {
                id: e.id.clone(),
                name: e.name.clone(),
            })
            .collect())
    }

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<String, DriveError> {
        self.state.lock().unwrap().calls.create_folder += 1;
        Ok(self.insert(name, parent, true, Vec::new()))
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &str,
        bytes: Vec<u8>,
        _mime_type: &str,
    ) -> Result<String, DriveError> {
        let (fail, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.create_file += 1;
            (state.fail_uploads, state.upload_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(DriveError::ApiError {
                status: 500,
                message: "backend error".to_string(),
            });
        }
        Ok(self.insert(name, Some(parent), false, bytes))
    }

    async fn folder_exists(&self, id: &str) -> Result<bool, DriveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.folder_exists += 1;
        Ok(state.entries.iter().any(|e| e.id == id && e.folder))
    }
}

/// Hands out a shared [`MemoryDrive`], or fails when told to.
pub struct MemoryAuth {
    drive: Arc<MemoryDrive>,
    fail: bool,
    attempts: AtomicUsize,
}

impl MemoryAuth {
    pub fn new(drive: Arc<MemoryDrive>) -> Arc<Self> {
        Arc::new(Self {
            drive,
            fail: false,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn failing(drive: Arc<MemoryDrive>) -> Arc<Self> {
        Arc::new(Self {
            drive,
            fail: true,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for MemoryAuth {
    async fn authenticate(&self) -> Result<Arc<dyn DriveBackend>, DriveError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DriveError::MissingToken {
                env: "TEST_TOKEN".to_string(),
            });
        }
        let drive: Arc<dyn DriveBackend> = self.drive.clone();
        Ok(drive)
    }
}

// === Files ===

/// Write a frame file with the given contents.
pub fn write_frame(dir: &Path, name: &str, bytes: &[u8]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), bytes).unwrap();
}
