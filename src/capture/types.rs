//! Data carried through a capture session.

use std::path::{Path, PathBuf};

use crate::device::{ScreenSize, Swipe};
use crate::hasher::ContentDigest;
use crate::settings::{channel_short, ChannelRegistry, SettingsError};

/// A frame kept by the session: it differed from the one before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub sequence_number: u32,
    pub path: PathBuf,
    pub digest: ContentDigest,
}

/// Why a session ended before running all its iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The stop signal was raised.
    Requested,
    /// Too many consecutive identical frames: the end of the list was reached.
    Exhausted,
    /// A device or disk operation failed.
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped(StopReason),
    /// Every iteration ran.
    Completed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped(_) | SessionState::Completed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Running => write!(f, "running"),
            SessionState::Stopped(StopReason::Requested) => write!(f, "stopped on request"),
            SessionState::Stopped(StopReason::Exhausted) => write!(f, "reached end of content"),
            SessionState::Stopped(StopReason::Errored(msg)) => write!(f, "stopped on error: {}", msg),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub state: SessionState,
    /// Distinct frames kept.
    pub taken: u32,
    /// Capture attempts, duplicates included.
    pub attempted: u32,
    pub first_number: u32,
    /// Sequence number of the last kept frame.
    pub last_number: Option<u32>,
    pub output_dir: PathBuf,
}

/// Progress notifications, in order, for whoever drives the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Log(String),
    Frame { frame: CapturedFrame, taken: u32 },
    Duplicate { number: u32, stuck: u32, limit: u32 },
    Finished(SessionReport),
}

/// Where a session writes and how its files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    /// `{out}/{channel display}/{branch display}`
    pub output_dir: PathBuf,
    pub channel_name: String,
    pub channel_short: String,
    pub branch_code: String,
    pub branch_name: String,
}

impl SessionTarget {
    /// Resolve a (channel key, branch code) selection against the registry.
    pub fn from_registry(
        registry: &ChannelRegistry,
        out_root: &Path,
        channel_key: &str,
        branch_code: &str,
    ) -> Result<Self, SettingsError> {
        registry.validate(channel_key, branch_code)?;
        let channel_name = registry.channel_name(channel_key).to_string();
        let branch_name = registry.branch_name(channel_key, branch_code).to_string();
        Ok(Self {
            output_dir: out_root.join(&channel_name).join(&branch_name),
            channel_short: channel_short(&channel_name).to_string(),
            channel_name,
            branch_code: branch_code.to_string(),
            branch_name,
        })
    }
}

/// Scroll gesture: from `1 - padding_bottom` up to `padding_top` of the height,
/// centred horizontally.
pub fn plan_swipe(screen: ScreenSize, padding_top: f64, padding_bottom: f64, duration_ms: u32) -> Swipe {
    let h = f64::from(screen.height);
    let x = (screen.width / 2) as i32;
    Swipe {
        x1: x,
        y1: (h * (1.0 - padding_bottom)) as i32,
        x2: x,
        y2: (h * padding_top) as i32,
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_swipe_default_paddings() {
        let swipe = plan_swipe(
            ScreenSize {
                width: 1080,
                height: 2400,
            },
            0.22,
            0.18,
            550,
        );
        assert_eq!(swipe.x1, 540);
        assert_eq!(swipe.x2, 540);
        assert_eq!(swipe.y1, 1968);
        assert_eq!(swipe.y2, 528);
        assert_eq!(swipe.duration_ms, 550);
    }

    #[test]
    fn test_target_from_registry() {
        let registry = ChannelRegistry::default();
        let target =
            SessionTarget::from_registry(&registry, Path::new("shots"), "shopeefood", "BC").unwrap();
        assert_eq!(target.output_dir, PathBuf::from("shots/ShopeeFood/Bàu Cát"));
        assert_eq!(target.channel_short, "Shopee");
        assert_eq!(target.branch_name, "Bàu Cát");
    }

    #[test]
    fn test_target_rejects_unknown_branch() {
        let registry = ChannelRegistry::default();
        assert!(SessionTarget::from_registry(&registry, Path::new("shots"), "grabfood", "ZZ").is_err());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Stopped(StopReason::Exhausted).to_string(), "reached end of content");
        assert!(SessionState::Completed.is_terminal());
        assert!(!SessionState::Running.is_terminal());
    }
}
