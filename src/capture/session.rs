//! The scroll-and-capture loop.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::errors::CaptureError;
use super::stop::StopSignal;
use super::types::{
    plan_swipe, CapturedFrame, SessionEvent, SessionReport, SessionState, SessionTarget, StopReason,
};
use crate::device::{DeviceBridge, ScreenSize, Swipe};
use crate::drive::{UploadItem, Uploader};
use crate::hasher::ContentDigest;
use crate::numbering::{self, RenumberOutcome};
use crate::settings::CaptureSettings;

/// A prepared capture run against one device and one output folder.
///
/// Construct with [`CaptureSession::prepare`], then consume with
/// [`CaptureSession::run`].
pub struct CaptureSession {
    bridge: Arc<dyn DeviceBridge>,
    serial: String,
    target: SessionTarget,
    screen: ScreenSize,
    swipe: Swipe,
    start_number: u32,
    max_shots: u32,
    overswipe_limit: u32,
    delay: Duration,
    sorted: Option<RenumberOutcome>,
    uploads: Option<Arc<Uploader>>,
    state: SessionState,
}

impl CaptureSession {
    /// Set up a session: tune the device, read its screen size, create the
    /// output directory, optionally renumber existing frames and choose the
    /// first sequence number.
    ///
    /// Any failure here is a setup error and nothing is captured.
    pub fn prepare(
        bridge: Arc<dyn DeviceBridge>,
        serial: &str,
        target: SessionTarget,
        settings: &CaptureSettings,
    ) -> Result<Self, CaptureError> {
        if settings.tune {
            bridge.tune(serial);
            log::info!("Applied device tuning to {}", serial);
        }

        let screen = bridge.screen_size(serial)?;
        log::info!("Screen size: {}x{}", screen.width, screen.height);

        std::fs::create_dir_all(&target.output_dir).map_err(|e| CaptureError::OutputDir {
            path: target.output_dir.clone(),
            source: e,
        })?;

        let sorted = if settings.auto_sort {
            match numbering::renumber_contiguous(
                &target.output_dir,
                &target.branch_code,
                &target.channel_short,
            ) {
                Ok(outcome) => {
                    if outcome.renamed > 0 {
                        log::info!(
                            "Renumbered {} of {} existing frames",
                            outcome.renamed,
                            outcome.total
                        );
                    }
                    Some(outcome)
                }
                Err(e) => {
                    log::warn!("Skipping renumbering of {}: {}", target.output_dir.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let start_number = if settings.continue_numbering {
            numbering::next_number(&target.output_dir, &target.branch_code, &target.channel_short)
        } else {
            1
        };

        let swipe = plan_swipe(
            screen,
            settings.padding_top,
            settings.padding_bottom,
            settings.swipe_ms,
        );

        Ok(Self {
            bridge,
            serial: serial.to_string(),
            target,
            screen,
            swipe,
            start_number,
            max_shots: settings.shots,
            overswipe_limit: settings.overswipe_limit(),
            delay: settings.delay_duration(),
            sorted,
            uploads: None,
            state: SessionState::Idle,
        })
    }

    /// Enqueue every kept frame on `uploader`, starting its worker as needed.
    pub fn with_uploads(mut self, uploader: Arc<Uploader>) -> Self {
        self.uploads = Some(uploader);
        self
    }

    pub fn target(&self) -> &SessionTarget {
        &self.target
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn swipe_plan(&self) -> Swipe {
        self.swipe
    }

    pub fn start_number(&self) -> u32 {
        self.start_number
    }

    /// Renumbering done during setup, if auto-sort ran.
    pub fn sorted(&self) -> Option<RenumberOutcome> {
        self.sorted
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the loop until the content is exhausted, `stop` is raised, a device
    /// call fails, or `shots` captures were attempted.
    ///
    /// Frames already written are kept whatever the outcome. Events are
    /// best-effort: a dropped receiver does not stop the session.
    pub fn run(mut self, stop: &StopSignal, events: &Sender<SessionEvent>) -> SessionReport {
        self.state = SessionState::Running;
        let emit = |event: SessionEvent| {
            let _ = events.send(event);
        };

        emit(SessionEvent::Log(format!(
            "Saving to {}",
            self.target.output_dir.display()
        )));
        if self.start_number > 1 {
            emit(SessionEvent::Log(format!(
                "Found {} existing frames, continuing from {}",
                self.start_number - 1,
                self.start_number
            )));
        }
        emit(SessionEvent::Log(format!(
            "Swipe ({},{}) -> ({},{}) over {}ms",
            self.swipe.x1, self.swipe.y1, self.swipe.x2, self.swipe.y2, self.swipe.duration_ms
        )));

        let mut previous: Option<ContentDigest> = None;
        let mut stuck = 0u32;
        let mut taken = 0u32;
        let mut attempted = 0u32;
        let mut last_number = None;
        let mut outcome = SessionState::Completed;

        let end = self.start_number.saturating_add(self.max_shots);
        for number in self.start_number..end {
            if stop.is_triggered() {
                emit(SessionEvent::Log("Stopped on request".to_string()));
                outcome = SessionState::Stopped(StopReason::Requested);
                break;
            }

            attempted += 1;
            let digest = match self.capture(number) {
                Ok(digest) => digest,
                Err(e) => {
                    log::error!("Capture {} failed: {}", number, e);
                    outcome = SessionState::Stopped(StopReason::Errored(e.to_string()));
                    break;
                }
            };

            if previous == Some(digest) {
                stuck += 1;
                log::debug!("Frame {:02} repeats the previous one ({}/{})", number, stuck, self.overswipe_limit);
                emit(SessionEvent::Duplicate {
                    number,
                    stuck,
                    limit: self.overswipe_limit,
                });
                if stuck >= self.overswipe_limit {
                    emit(SessionEvent::Log(format!(
                        "End of content after {} identical frames, stopping at {}",
                        stuck, number
                    )));
                    outcome = SessionState::Stopped(StopReason::Exhausted);
                    break;
                }
            } else {
                stuck = 0;
                taken += 1;
                last_number = Some(number);
                let frame = CapturedFrame {
                    sequence_number: number,
                    path: self.frame_path(number),
                    digest,
                };
                log::info!("Captured {} ({})", frame.path.display(), digest.short());
                self.enqueue_upload(&frame);
                emit(SessionEvent::Frame { frame, taken });
            }

            if let Err(e) = self.bridge.swipe(&self.serial, &self.swipe) {
                log::error!("Swipe failed: {}", e);
                outcome = SessionState::Stopped(StopReason::Errored(e.to_string()));
                break;
            }
            thread::sleep(self.delay);
            previous = Some(digest);
        }

        self.state = outcome.clone();
        let report = SessionReport {
            state: outcome,
            taken,
            attempted,
            first_number: self.start_number,
            last_number,
            output_dir: self.target.output_dir.clone(),
        };
        emit(SessionEvent::Finished(report.clone()));
        report
    }

    fn frame_path(&self, number: u32) -> std::path::PathBuf {
        self.target.output_dir.join(numbering::frame_file_name(
            number,
            &self.target.branch_code,
            &self.target.channel_short,
        ))
    }

    fn capture(&self, number: u32) -> Result<ContentDigest, CaptureError> {
        let path = self.frame_path(number);
        self.bridge.capture_to_file(&self.serial, &path)?;
        ContentDigest::of_file(&path).map_err(|e| CaptureError::Digest { path, source: e })
    }

    fn enqueue_upload(&self, frame: &CapturedFrame) {
        let Some(uploader) = &self.uploads else {
            return;
        };
        let file_name = frame
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        uploader.enqueue(UploadItem::new(
            frame.path.clone(),
            &self.target.channel_name,
            &self.target.branch_code,
            file_name,
        ));
        uploader.start_worker();
    }
}
