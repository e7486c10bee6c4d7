//! Background upload queue.
//!
//! Producers (a capture session, a bulk folder scan) push [`UploadItem`]s onto
//! an unbounded FIFO. A single worker thread drains it, one item at a time,
//! and goes idle once the queue stays empty for the idle timeout. Producers
//! restart it with [`Uploader::start_worker`].

use chrono::{DateTime, Local};
use crossbeam::channel::{bounded, select, unbounded, Receiver, Sender};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::backend::{mime_type_for, Authenticator, DriveBackend, EntryQuery};
use super::error::DriveError;
use super::folders::{FolderResolver, ResolveError};
use crate::numbering::FramePattern;
use crate::settings::{FolderLayout, UploadStats};

/// How long the worker waits on an empty queue before going idle.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bound on [`Uploader::stop_worker`].
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A file waiting to be mirrored.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    pub file_path: PathBuf,
    pub channel_name: String,
    /// Branch code; custom mappings are keyed by it.
    pub branch_identifier: String,
    /// Remote name, when it should differ from the local file name.
    pub display_name: Option<String>,
    pub enqueued_at: DateTime<Local>,
}

impl UploadItem {
    pub fn new(
        file_path: PathBuf,
        channel_name: &str,
        branch_identifier: &str,
        display_name: Option<String>,
    ) -> Self {
        Self {
            file_path,
            channel_name: channel_name.to_string(),
            branch_identifier: branch_identifier.to_string(),
            display_name,
            enqueued_at: Local::now(),
        }
    }

    /// Name the file gets on Drive.
    pub fn target_name(&self) -> String {
        self.display_name.clone().unwrap_or_else(|| {
            self.file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

/// Receives upload progress. Both methods run on the worker thread.
pub trait UploadObserver: Send + Sync {
    /// Called once per dequeued item.
    fn on_progress(&self, _success: bool, _item: &UploadItem) {}

    /// Called when the worker goes idle or is stopped.
    fn on_complete(&self, _stats: &UploadStats) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl UploadObserver for NoopObserver {}

/// Why an item could not be uploaded.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Authentication failed: {0}")]
    Auth(#[source] DriveError),

    #[error("Could not resolve destination folder: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Upload failed: {0}")]
    Drive(#[from] DriveError),

    #[error("File does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to an item that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { file_id: String },
    /// An entry with the same name already exists in the destination.
    AlreadyPresent,
}

/// Snapshot returned by [`Uploader::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct UploadStatus {
    pub running: bool,
    pub queue_len: usize,
    pub stats: UploadStats,
}

struct WorkerState {
    authenticator: Arc<dyn Authenticator>,
    client: Option<Arc<dyn DriveBackend>>,
    resolver: FolderResolver,
}

/// Everything the worker thread needs, cloned out of the [`Uploader`].
struct WorkerContext {
    rx: Receiver<UploadItem>,
    state: Arc<Mutex<WorkerState>>,
    stats: Arc<Mutex<UploadStats>>,
    observer: Arc<dyn UploadObserver>,
    running: Arc<AtomicBool>,
    stop_rx: Receiver<()>,
    idle_timeout: Duration,
}

/// What the worker's wait on the queue produced.
enum Next {
    Item(UploadItem),
    Stop,
    Idle,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// FIFO upload queue with a restartable single worker.
pub struct Uploader {
    tx: Sender<UploadItem>,
    rx: Receiver<UploadItem>,
    state: Arc<Mutex<WorkerState>>,
    stats: Arc<Mutex<UploadStats>>,
    observer: Arc<dyn UploadObserver>,
    running: Arc<AtomicBool>,
    /// Holds at most one pending stop request.
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    idle_timeout: Duration,
}

impl Uploader {
    /// Create an idle uploader. `stats` carries the persisted totals.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        layout: FolderLayout,
        stats: UploadStats,
        observer: Arc<dyn UploadObserver>,
    ) -> Self {
        let (tx, rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(1);
        Self {
            tx,
            rx,
            state: Arc::new(Mutex::new(WorkerState {
                authenticator,
                client: None,
                resolver: FolderResolver::new(layout),
            })),
            stats: Arc::new(Mutex::new(stats)),
            observer,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx,
            stop_rx,
            handle: Mutex::new(None),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Queue an item. Does not start the worker.
    pub fn enqueue(&self, item: UploadItem) {
        log::debug!("Queued {} for upload", item.file_path.display());
        // The uploader owns a receiver, so the channel can't be disconnected.
        let _ = self.tx.send(item);
    }

    /// Queue every frame matching `pattern` in `dir`, in numeric order.
    ///
    /// Returns how many were queued. Does not start the worker.
    pub fn enqueue_folder(
        &self,
        dir: &Path,
        pattern: &FramePattern,
        channel_name: &str,
    ) -> io::Result<usize> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("folder does not exist: {}", dir.display()),
            ));
        }
        let frames = pattern.scan(dir)?;
        for frame in &frames {
            self.enqueue(UploadItem::new(
                frame.path.clone(),
                channel_name,
                pattern.branch_code(),
                None,
            ));
        }
        log::info!("Queued {} files from {}", frames.len(), dir.display());
        Ok(frames.len())
    }

    /// Start the worker thread. Returns false when one is already running.
    pub fn start_worker(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        // Drop a stop request left over from a worker that had already exited.
        while self.stop_rx.try_recv().is_ok() {}
        lock(&self.stats).begin_session();

        let mut handle = lock(&self.handle);
        if let Some(previous) = handle.take() {
            // `running` is already false, so the previous worker is past its
            // loop and at most still inside `on_complete`.
            let _ = previous.join();
        }

        let ctx = WorkerContext {
            rx: self.rx.clone(),
            state: Arc::clone(&self.state),
            stats: Arc::clone(&self.stats),
            observer: Arc::clone(&self.observer),
            running: Arc::clone(&self.running),
            stop_rx: self.stop_rx.clone(),
            idle_timeout: self.idle_timeout,
        };

        match thread::Builder::new()
            .name("drive-upload".to_string())
            .spawn(move || worker_loop(ctx))
        {
            Ok(h) => {
                log::info!("Upload worker started");
                *handle = Some(h);
                true
            }
            Err(e) => {
                log::error!("Failed to spawn upload worker: {}", e);
                self.running.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    /// Ask the worker to stop after its current item and wait up to `timeout`.
    ///
    /// Items still queued stay queued. Returns false if the worker did not
    /// exit in time.
    pub fn stop_worker(&self, timeout: Duration) -> bool {
        // A full channel means a request is already pending.
        let _ = self.stop_tx.try_send(());
        let Some(handle) = lock(&self.handle).take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                log::warn!("Upload worker did not stop within {:?}", timeout);
                *lock(&self.handle) = Some(handle);
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
        let _ = handle.join();
        log::info!("Upload worker stopped");
        true
    }

    /// Block until the worker has gone idle, up to `timeout`.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let finished = lock(&self.handle)
                .as_ref()
                .map_or(true, |h| h.is_finished());
            if finished && !self.is_running() {
                if let Some(handle) = lock(&self.handle).take() {
                    let _ = handle.join();
                }
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn queue_len(&self) -> usize {
        self.rx.len()
    }

    pub fn stats(&self) -> UploadStats {
        lock(&self.stats).clone()
    }

    pub fn status(&self) -> UploadStatus {
        UploadStatus {
            running: self.is_running(),
            queue_len: self.queue_len(),
            stats: self.stats(),
        }
    }

    pub fn reset_stats(&self) {
        lock(&self.stats).reset();
        log::info!("Upload statistics reset");
    }

    /// Apply a new folder layout. The folder cache is dropped if it changed.
    pub fn configure(&self, layout: &FolderLayout) {
        if lock(&self.state).resolver.configure(layout) {
            log::info!("Drive folder layout changed, folder cache cleared");
        }
    }

    /// Current folder layout, including mappings added by quick setup.
    pub fn layout(&self) -> FolderLayout {
        lock(&self.state).resolver.layout().clone()
    }
}

fn worker_loop(ctx: WorkerContext) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start upload runtime: {}", e);
            ctx.running.store(false, Ordering::SeqCst);
            return;
        }
    };

    let mut released = false;
    loop {
        // A pending stop wins over a ready item.
        if ctx.stop_rx.try_recv().is_ok() {
            log::info!("Upload worker stopping on request");
            break;
        }

        let next = select! {
            recv(ctx.rx) -> msg => msg.map_or(Next::Stop, Next::Item),
            recv(ctx.stop_rx) -> _ => Next::Stop,
            default(ctx.idle_timeout) => Next::Idle,
        };

        let item = match next {
            Next::Item(item) => item,
            Next::Stop => {
                log::info!("Upload worker stopping on request");
                break;
            }
            Next::Idle => {
                if !ctx.rx.is_empty() {
                    continue;
                }
                ctx.running.store(false, Ordering::SeqCst);
                // An item may have arrived after the timeout but before the
                // flag dropped; take it back unless a new worker already has.
                if !ctx.rx.is_empty()
                    && ctx
                        .running
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    continue;
                }
                log::info!("Upload queue empty, worker going idle");
                released = true;
                break;
            }
        };

        let result = {
            let mut state = lock(&ctx.state);
            runtime.block_on(process_item(&mut state, &item))
        };

        let success = match result {
            Ok(UploadOutcome::Uploaded { file_id }) => {
                log::info!("Uploaded {} ({})", item.target_name(), file_id);
                true
            }
            Ok(UploadOutcome::AlreadyPresent) => {
                log::info!("{} already on Drive, skipped", item.target_name());
                true
            }
            Err(e) => {
                log::error!("Failed to upload {}: {}", item.file_path.display(), e);
                false
            }
        };

        {
            let mut stats = lock(&ctx.stats);
            if success {
                stats.record_success(Local::now());
            } else {
                stats.record_failure();
            }
        }
        ctx.observer.on_progress(success, &item);
    }

    if !released {
        ctx.running.store(false, Ordering::SeqCst);
    }
    let snapshot = lock(&ctx.stats).clone();
    ctx.observer.on_complete(&snapshot);
}

async fn process_item(state: &mut WorkerState, item: &UploadItem) -> Result<UploadOutcome, UploadError> {
    let client = match &state.client {
        Some(client) => Arc::clone(client),
        None => {
            let client = state
                .authenticator
                .authenticate()
                .await
                .map_err(UploadError::Auth)?;
            state.client = Some(Arc::clone(&client));
            client
        }
    };

    let result = upload_with(client.as_ref(), &mut state.resolver, item).await;
    if let Err(UploadError::Drive(e)) | Err(UploadError::Resolve(ResolveError::Backend(e))) = &result {
        if e.is_unauthorized() {
            // Re-authenticate on the next item.
            state.client = None;
        }
    }
    result
}

async fn upload_with(
    client: &dyn DriveBackend,
    resolver: &mut FolderResolver,
    item: &UploadItem,
) -> Result<UploadOutcome, UploadError> {
    let folder = resolver
        .resolve(client, &item.channel_name, &item.branch_identifier)
        .await?;

    if !item.file_path.is_file() {
        return Err(UploadError::MissingFile(item.file_path.clone()));
    }

    let name = item.target_name();
    let existing = client.list_entries(&EntryQuery::file(&name, &folder)).await?;
    if !existing.is_empty() {
        return Ok(UploadOutcome::AlreadyPresent);
    }

    let bytes = tokio::fs::read(&item.file_path)
        .await
        .map_err(|e| UploadError::Io {
            path: item.file_path.clone(),
            source: e,
        })?;
    let file_id = client
        .create_file(&name, &folder, bytes, mime_type_for(&item.file_path))
        .await?;
    Ok(UploadOutcome::Uploaded { file_id })
}
