//! Android device access.
//!
//! The capture loop only talks to [`DeviceBridge`]; [`AdbBridge`] implements it
//! by shelling out to `adb`.

pub mod adb;
pub mod errors;

pub use adb::AdbBridge;
pub use errors::DeviceError;

use std::path::Path;

/// Physical screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// A vertical swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub duration_ms: u32,
}

/// Operations the capture loop needs from a device.
pub trait DeviceBridge: Send + Sync {
    /// Serials of attached devices in the `device` state.
    fn list_devices(&self) -> Result<Vec<String>, DeviceError>;

    fn screen_size(&self, serial: &str) -> Result<ScreenSize, DeviceError>;

    /// Write a PNG screenshot to `path`, replacing any existing file.
    fn capture_to_file(&self, serial: &str, path: &Path) -> Result<(), DeviceError>;

    fn swipe(&self, serial: &str, swipe: &Swipe) -> Result<(), DeviceError>;

    /// Disable animations and extend the screen-off timeout. Best effort:
    /// individual failures are logged, never returned.
    fn tune(&self, serial: &str);
}

/// Pick the device to drive.
///
/// With `requested`, it must be attached. Without, exactly one device must be.
pub fn select_device(
    bridge: &dyn DeviceBridge,
    requested: Option<&str>,
) -> Result<String, DeviceError> {
    let mut available = bridge.list_devices()?;

    if let Some(serial) = requested {
        if available.iter().any(|s| s == serial) {
            return Ok(serial.to_string());
        }
        return Err(DeviceError::DeviceNotFound {
            requested: serial.to_string(),
            available,
        });
    }

    match available.len() {
        0 => Err(DeviceError::NoDevice),
        1 => Ok(available.swap_remove(0)),
        _ => Err(DeviceError::AmbiguousDevice { available }),
    }
}
