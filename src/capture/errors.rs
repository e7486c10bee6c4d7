//! Error types for capture sessions.

use std::path::PathBuf;

use crate::device::DeviceError;

/// Errors that prevent a capture session from starting, or end one early.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Failed to create output directory '{}': {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Digest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
