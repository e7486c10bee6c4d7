//! Errors surfaced by CLI commands.

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::device::DeviceError;
use crate::drive::{DriveError, ResolveError};
use crate::settings::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Interrupt(#[from] ctrlc::Error),

    #[error("No channel/branch selected")]
    NoSelection,

    #[error("Capture session failed: {0}")]
    SessionFailed(String),

    #[error("{0}")]
    Usage(String),
}
