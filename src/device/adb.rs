//! [`DeviceBridge`] over the `adb` command-line tool.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use super::{DeviceBridge, DeviceError, ScreenSize, Swipe};

/// Settings applied by [`AdbBridge::tune`]: animations off, 30 minute screen timeout.
const TUNE_SETTINGS: &[(&str, &str, &str)] = &[
    ("global", "window_animation_scale", "0"),
    ("global", "transition_animation_scale", "0"),
    ("global", "animator_duration_scale", "0"),
    ("system", "screen_off_timeout", "1800000"),
];

/// Drives a device through the `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbBridge {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run `adb [-s serial] args...` and return its output on success.
    fn run(&self, serial: Option<&str>, args: &[&str]) -> Result<Output, DeviceError> {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = serial {
            cmd.args(["-s", serial]);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeviceError::AdbNotFound {
                    program: self.program.clone(),
                }
            } else {
                DeviceError::Io {
                    path: None,
                    source: e,
                }
            }
        })?;

        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }

    fn run_text(&self, serial: Option<&str>, args: &[&str]) -> Result<String, DeviceError> {
        let output = self.run(serial, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DeviceBridge for AdbBridge {
    fn list_devices(&self) -> Result<Vec<String>, DeviceError> {
        let out = self.run_text(None, &["devices"])?;
        Ok(parse_device_list(&out))
    }

    fn screen_size(&self, serial: &str) -> Result<ScreenSize, DeviceError> {
        let out = self.run_text(Some(serial), &["shell", "wm", "size"])?;
        if let Some(size) = parse_size_after(&out, "Physical size:") {
            return Ok(size);
        }

        log::debug!("wm size gave no physical size, falling back to dumpsys display");
        let out = self.run_text(Some(serial), &["shell", "dumpsys", "display"])?;
        parse_size_after(&out, "cur=").ok_or(DeviceError::ScreenSizeUnavailable)
    }

    fn capture_to_file(&self, serial: &str, path: &Path) -> Result<(), DeviceError> {
        let output = self.run(Some(serial), &["exec-out", "screencap", "-p"])?;
        if output.stdout.is_empty() {
            return Err(DeviceError::EmptyCapture);
        }
        std::fs::write(path, &output.stdout).map_err(|e| DeviceError::Io {
            path: Some(path.to_path_buf()),
            source: e,
        })
    }

    fn swipe(&self, serial: &str, swipe: &Swipe) -> Result<(), DeviceError> {
        let args = [
            swipe.x1.to_string(),
            swipe.y1.to_string(),
            swipe.x2.to_string(),
            swipe.y2.to_string(),
            swipe.duration_ms.to_string(),
        ];
        let mut cmd: Vec<&str> = vec!["shell", "input", "swipe"];
        cmd.extend(args.iter().map(String::as_str));
        self.run(Some(serial), &cmd)?;
        Ok(())
    }

    fn tune(&self, serial: &str) {
        for &(namespace, key, value) in TUNE_SETTINGS {
            let args = ["shell", "settings", "put", namespace, key, value];
            if let Err(e) = self.run(Some(serial), &args) {
                log::warn!("Could not set {} {}: {}", namespace, key, e);
            }
        }
    }
}

/// Parse `adb devices` output into the serials whose state is `device`.
///
/// Unauthorized and offline entries are skipped.
pub fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let serial = parts.next()?.trim();
            let state = parts.next()?.trim();
            (state == "device" && !serial.is_empty()).then(|| serial.to_string())
        })
        .collect()
}

/// Find `WxH` after the first occurrence of `marker`.
///
/// Handles both `Physical size: 1080x2400` and `cur=1080x2400 app=...`.
pub fn parse_size_after(output: &str, marker: &str) -> Option<ScreenSize> {
    let start = output.find(marker)? + marker.len();
    let rest = output[start..].trim_start();

    let (width, rest) = split_number(rest)?;
    let rest = rest.strip_prefix('x')?;
    let (height, _) = split_number(rest)?;

    if width == 0 || height == 0 {
        return None;
    }
    Some(ScreenSize { width, height })
}

fn split_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}
