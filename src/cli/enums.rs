//! CLI enum types.

use clap::ValueEnum;

/// On/off value for settings toggles (`--date-folders off`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> Self {
        matches!(t, Toggle::On)
    }
}

/// Apply an optional toggle to `target`. Returns true when it changed.
pub fn apply_toggle(target: &mut bool, toggle: Option<Toggle>) -> bool {
    match toggle {
        Some(t) if *target != bool::from(t) => {
            *target = t.into();
            true
        }
        _ => false,
    }
}
