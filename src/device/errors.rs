//! Error types for device operations.

use std::path::PathBuf;

/// Errors that can occur while talking to an Android device.
#[derive(Debug)]
pub enum DeviceError {
    /// The adb executable could not be started
    AdbNotFound { program: String },
    /// adb ran but exited unsuccessfully
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    /// Local I/O failure (spawning adb, writing a screenshot)
    Io {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
    /// No device attached
    NoDevice,
    /// Requested serial is not attached
    DeviceNotFound {
        requested: String,
        available: Vec<String>,
    },
    /// Several devices attached and none requested
    AmbiguousDevice { available: Vec<String> },
    /// Neither `wm size` nor `dumpsys display` reported a resolution
    ScreenSizeUnavailable,
    /// screencap produced no bytes
    EmptyCapture,
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::AdbNotFound { program } => {
                write!(
                    f,
                    "adb not found (tried '{}'). Install Android platform-tools and make sure adb is on PATH,\nor set `adb` under [device] in config.toml.",
                    program
                )
            }
            DeviceError::CommandFailed {
                command,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "`{}` failed with exit code {}", command, code)?,
                    None => write!(f, "`{}` was terminated by a signal", command)?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            DeviceError::Io { path, source } => match path {
                Some(path) => write!(f, "I/O error on '{}': {}", path.display(), source),
                None => write!(f, "I/O error: {}", source),
            },
            DeviceError::NoDevice => {
                write!(
                    f,
                    "No device or emulator found.\n\nStart an AVD or plug in a phone with USB debugging enabled, then check with:\n\n    adb devices\n"
                )
            }
            DeviceError::DeviceNotFound {
                requested,
                available,
            } => {
                write!(f, "Device '{}' not found.", requested)?;
                if available.is_empty() {
                    write!(f, " No devices are attached.")
                } else {
                    write!(f, "\n\nAttached devices:\n")?;
                    for serial in available {
                        writeln!(f, "  - {}", serial)?;
                    }
                    Ok(())
                }
            }
            DeviceError::AmbiguousDevice { available } => {
                write!(f, "More than one device attached. Pick one with --serial:\n\n")?;
                for serial in available {
                    writeln!(f, "  - {}", serial)?;
                }
                Ok(())
            }
            DeviceError::ScreenSizeUnavailable => {
                write!(f, "Could not determine the device screen resolution.")
            }
            DeviceError::EmptyCapture => write!(f, "Screenshot came back empty."),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
