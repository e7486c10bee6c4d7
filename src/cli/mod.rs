//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, interactive menus
//! and subcommand handlers.

mod args;
mod commands;
mod enums;
mod error;
pub mod menu;

pub use args::{Args, Command, ConfigAction, DriveAction, PresetAction, Selection};
pub use commands::{
    apply_overrides, handle_config_action, handle_drive_action, handle_preset_action,
    list_devices, run, run_capture, run_sort, run_stats, run_upload, Context,
};
pub use enums::Toggle;
pub use error::CliError;
