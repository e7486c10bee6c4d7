//! Capture loop tests against a scripted device.

mod common;

use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use common::{write_frame, FakeBridge, MemoryAuth, MemoryDrive};
use scrollshot::capture::{
    CaptureError, CaptureSession, SessionEvent, SessionReport, SessionState, SessionTarget,
    StopReason, StopSignal,
};
use scrollshot::drive::{NoopObserver, Uploader};
use scrollshot::numbering::list_frames;
use scrollshot::settings::{CaptureSettings, FolderLayout, UploadStats};
use tempfile::TempDir;

fn target(dir: &Path) -> SessionTarget {
    SessionTarget {
        output_dir: dir.join("ShopeeFood").join("Bàu Cát"),
        channel_name: "ShopeeFood".to_string(),
        channel_short: "Shopee".to_string(),
        branch_code: "BC".to_string(),
        branch_name: "Bàu Cát".to_string(),
    }
}

fn settings(shots: u32, overswipe: u32) -> CaptureSettings {
    CaptureSettings {
        shots,
        overswipe,
        delay: 0.0,
        ..CaptureSettings::default()
    }
}

fn run(
    bridge: Arc<FakeBridge>,
    dir: &Path,
    settings: &CaptureSettings,
    stop: &StopSignal,
) -> (SessionReport, Vec<SessionEvent>) {
    let session = CaptureSession::prepare(bridge, "emulator-5554", target(dir), settings).unwrap();
    let (tx, rx) = mpsc::channel();
    let report = session.run(stop, &tx);
    drop(tx);
    (report, rx.into_iter().collect())
}

fn frame_numbers(dir: &Path) -> Vec<u32> {
    list_frames(&target(dir).output_dir, "BC", "Shopee")
        .unwrap()
        .iter()
        .map(|f| f.number)
        .collect()
}

// === Duplicate detection ===

#[test]
fn test_duplicate_run_ends_session() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::new(&[b"A", b"B", b"B", b"B"]));

    let (report, events) = run(bridge.clone(), dir.path(), &settings(10, 2), &StopSignal::new());

    assert_eq!(report.state, SessionState::Stopped(StopReason::Exhausted));
    assert_eq!(report.taken, 2);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.last_number, Some(2));
    assert_eq!(bridge.captures(), 4);
    // No swipe after the capture that hit the limit.
    assert_eq!(bridge.swipes().len(), 3);

    let duplicates: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Duplicate { number, stuck, .. } => Some((*number, *stuck)),
            _ => None,
        })
        .collect();
    assert_eq!(duplicates, vec![(3, 1), (4, 2)]);
}

#[test]
fn test_duplicate_streak_resets_on_new_content() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::new(&[b"A", b"A", b"B", b"B", b"C", b"C", b"C"]));

    let (report, _) = run(bridge.clone(), dir.path(), &settings(20, 2), &StopSignal::new());

    assert_eq!(report.state, SessionState::Stopped(StopReason::Exhausted));
    assert_eq!(report.taken, 3);
    assert_eq!(report.attempted, 7);
}

#[test]
fn test_overswipe_limit_one_stops_at_first_duplicate() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::new(&[b"A", b"B", b"B"]));

    let (report, _) = run(bridge.clone(), dir.path(), &settings(10, 1), &StopSignal::new());

    assert_eq!(report.state, SessionState::Stopped(StopReason::Exhausted));
    assert_eq!(report.taken, 2);
    assert_eq!(report.attempted, 3);
}

#[test]
fn test_overswipe_zero_is_treated_as_one() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::new(&[b"A", b"A"]));

    let (report, _) = run(bridge, dir.path(), &settings(10, 0), &StopSignal::new());

    assert_eq!(report.state, SessionState::Stopped(StopReason::Exhausted));
    assert_eq!(report.attempted, 2);
}

#[test]
fn test_distinct_frames_complete_all_shots() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::distinct(5));

    let (report, events) = run(bridge.clone(), dir.path(), &settings(5, 2), &StopSignal::new());

    assert_eq!(report.state, SessionState::Completed);
    assert_eq!(report.taken, 5);
    assert_eq!(report.attempted, 5);
    assert_eq!(bridge.swipes().len(), 5);
    assert_eq!(frame_numbers(dir.path()), vec![1, 2, 3, 4, 5]);

    let taken: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Frame { taken, .. } => Some(*taken),
            _ => None,
        })
        .collect();
    assert_eq!(taken, vec![1, 2, 3, 4, 5]);
    assert!(matches!(events.last(), Some(SessionEvent::Finished(r)) if r == &report));
}

#[test]
fn test_frame_events_carry_digest_and_path() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::new(&[b"pixels"]));

    let (_, events) = run(bridge, dir.path(), &settings(1, 2), &StopSignal::new());

    let frame = events
        .iter()
        .find_map(|e| match e {
            SessionEvent::Frame { frame, .. } => Some(frame.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(frame.sequence_number, 1);
    assert!(frame.path.ends_with("ShopeeFood/Bàu Cát/01_BC_Shopee.png"));
    assert_eq!(frame.digest, scrollshot::hasher::ContentDigest::of_bytes(b"pixels"));
}

// === Numbering ===

#[test]
fn test_continue_numbering_after_existing_frames() {
    let dir = TempDir::new().unwrap();
    let out = target(dir.path()).output_dir;
    for n in [1, 2, 5] {
        write_frame(&out, &format!("{:02}_BC_Shopee.png", n), format!("old{}", n).as_bytes());
    }
    let bridge = Arc::new(FakeBridge::distinct(2));
    let settings = CaptureSettings {
        auto_sort: false,
        ..settings(2, 2)
    };

    let (report, _) = run(bridge, dir.path(), &settings, &StopSignal::new());

    assert_eq!(report.first_number, 6);
    assert_eq!(frame_numbers(dir.path()), vec![1, 2, 5, 6, 7]);
}

#[test]
fn test_auto_sort_renumbers_before_continuing() {
    let dir = TempDir::new().unwrap();
    let out = target(dir.path()).output_dir;
    for n in [1, 2, 5] {
        write_frame(&out, &format!("{:02}_BC_Shopee.png", n), format!("old{}", n).as_bytes());
    }
    let bridge = Arc::new(FakeBridge::distinct(2));

    let session =
        CaptureSession::prepare(bridge, "emulator-5554", target(dir.path()), &settings(2, 2)).unwrap();
    assert_eq!(session.sorted().map(|o| o.renamed), Some(1));
    assert_eq!(session.start_number(), 4);

    let (tx, _rx) = mpsc::channel();
    session.run(&StopSignal::new(), &tx);
    assert_eq!(frame_numbers(dir.path()), vec![1, 2, 3, 4, 5]);
    assert_eq!(std::fs::read(out.join("03_BC_Shopee.png")).unwrap(), b"old5");
}

#[test]
fn test_reset_numbering_starts_at_one() {
    let dir = TempDir::new().unwrap();
    let out = target(dir.path()).output_dir;
    write_frame(&out, "01_BC_Shopee.png", b"old");
    write_frame(&out, "02_BC_Shopee.png", b"old");
    let bridge = Arc::new(FakeBridge::new(&[b"new"]));
    let settings = CaptureSettings {
        continue_numbering: false,
        ..settings(1, 2)
    };

    let (report, _) = run(bridge, dir.path(), &settings, &StopSignal::new());

    assert_eq!(report.first_number, 1);
    assert_eq!(std::fs::read(out.join("01_BC_Shopee.png")).unwrap(), b"new");
}

// === Stop and errors ===

#[test]
fn test_stop_before_start_makes_no_device_calls() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::distinct(3));
    let stop = StopSignal::new();
    stop.trigger();

    let (report, _) = run(bridge.clone(), dir.path(), &settings(3, 2), &stop);

    assert_eq!(report.state, SessionState::Stopped(StopReason::Requested));
    assert_eq!(report.attempted, 0);
    assert_eq!(bridge.captures(), 0);
    assert!(bridge.swipes().is_empty());
}

#[test]
fn test_stop_takes_effect_at_next_iteration() {
    let dir = TempDir::new().unwrap();
    let stop = StopSignal::new();
    let bridge = Arc::new(FakeBridge::distinct(10).triggering_stop_after(2, stop.clone()));

    let (report, _) = run(bridge.clone(), dir.path(), &settings(10, 2), &stop);

    assert_eq!(report.state, SessionState::Stopped(StopReason::Requested));
    assert_eq!(report.taken, 2);
    assert_eq!(bridge.captures(), 2);
    // The in-flight iteration still swipes.
    assert_eq!(bridge.swipes().len(), 2);
}

#[test]
fn test_capture_error_keeps_written_frames() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::distinct(10).failing_capture_at(3));

    let (report, _) = run(bridge, dir.path(), &settings(10, 2), &StopSignal::new());

    assert!(matches!(report.state, SessionState::Stopped(StopReason::Errored(_))));
    assert_eq!(report.taken, 2);
    assert_eq!(frame_numbers(dir.path()), vec![1, 2]);
}

#[test]
fn test_swipe_error_ends_session() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::distinct(10).failing_swipe_at(1));

    let (report, _) = run(bridge.clone(), dir.path(), &settings(10, 2), &StopSignal::new());

    match report.state {
        SessionState::Stopped(StopReason::Errored(message)) => {
            assert!(message.contains("device offline"))
        }
        other => panic!("unexpected state: {}", other),
    }
    assert_eq!(report.taken, 1);
    assert_eq!(bridge.captures(), 1);
}

// === Setup ===

#[test]
fn test_prepare_plans_swipe_and_tunes() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FakeBridge::distinct(1));
    let settings = CaptureSettings {
        tune: true,
        ..settings(1, 2)
    };

    let session =
        CaptureSession::prepare(bridge.clone(), "emulator-5554", target(dir.path()), &settings)
            .unwrap();

    assert_eq!(bridge.tune_calls(), 1);
    assert!(target(dir.path()).output_dir.is_dir());
    let swipe = session.swipe_plan();
    assert_eq!((swipe.x1, swipe.y1, swipe.x2, swipe.y2), (540, 1968, 540, 528));
    assert_eq!(swipe.duration_ms, 550);
    assert_eq!(*session.state(), SessionState::Idle);
}

#[test]
fn test_prepare_fails_when_output_dir_is_a_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ShopeeFood"), b"not a dir").unwrap();
    let bridge = Arc::new(FakeBridge::distinct(1));

    let result = CaptureSession::prepare(bridge, "emulator-5554", target(dir.path()), &settings(1, 2));
    assert!(matches!(result, Err(CaptureError::OutputDir { .. })));
}

// === Uploads ===

#[test]
fn test_kept_frames_are_uploaded() {
    let dir = TempDir::new().unwrap();
    let drive = MemoryDrive::new();
    let uploader = Arc::new(
        Uploader::new(
            MemoryAuth::new(drive.clone()),
            FolderLayout::default(),
            UploadStats::default(),
            Arc::new(NoopObserver),
        )
        .with_idle_timeout(Duration::from_millis(100)),
    );
    let bridge = Arc::new(FakeBridge::new(&[b"A", b"B", b"B", b"B"]));

    let session = CaptureSession::prepare(bridge, "emulator-5554", target(dir.path()), &settings(10, 2))
        .unwrap()
        .with_uploads(Arc::clone(&uploader));
    let (tx, _rx) = mpsc::channel();
    let report = session.run(&StopSignal::new(), &tx);

    assert!(uploader.wait_idle(Duration::from_secs(10)));
    assert_eq!(report.taken, 2);

    let mut names: Vec<String> = drive.all_files().into_iter().map(|(name, _)| name).collect();
    names.sort();
    assert_eq!(names, vec!["01_BC_Shopee.png", "02_BC_Shopee.png"]);
    assert_eq!(uploader.stats().total_uploaded, 2);
    assert_eq!(drive.file_bytes("02_BC_Shopee.png"), Some(b"B".to_vec()));
}
