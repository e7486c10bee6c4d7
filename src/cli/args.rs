//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Toggle;

/// Capture a scrolling Android screen into numbered screenshots
#[derive(Parser, Debug)]
#[command(name = "scrollshot")]
#[command(version, about = "Scrolling screenshot capture over adb", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Pick channel and branch interactively, capture until the list ends
    scrollshot

    # Capture ShopeeFood / Bau Cat with a shorter delay and upload to Drive
    scrollshot --channel shopeefood --branch BC --delay 0.8 --upload

    # Renumber a folder into 01, 02, ...
    scrollshot sort --channel grabfood --branch LVT

    # Map every branch to a Drive folder with the same name
    scrollshot drive quick-setup")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output root directory (frames go to <out>/<channel>/<branch>)
    #[arg(long, short, global = true)]
    pub out: Option<PathBuf>,

    /// Maximum number of captures
    #[arg(long)]
    pub shots: Option<u32>,

    /// Seconds to wait after each swipe
    #[arg(long)]
    pub delay: Option<f64>,

    /// Swipe duration in milliseconds
    #[arg(long)]
    pub swipe_ms: Option<u32>,

    /// Swipe end, as a fraction of screen height from the top
    #[arg(long)]
    pub padding_top: Option<f64>,

    /// Swipe start, as a fraction of screen height from the bottom
    #[arg(long)]
    pub padding_bottom: Option<f64>,

    /// Identical frames in a row that mean the end of the list
    #[arg(long)]
    pub overswipe: Option<u32>,

    /// Device serial (from `adb devices`)
    #[arg(long, global = true)]
    pub serial: Option<String>,

    /// Disable animations and extend screen timeout on the device
    #[arg(long)]
    pub tune: bool,

    /// Continue numbering after the highest existing frame
    #[arg(long, conflicts_with = "reset_numbering")]
    pub continue_numbering: bool,

    /// Start numbering at 1, overwriting existing frames
    #[arg(long)]
    pub reset_numbering: bool,

    /// Channel key (e.g. shopeefood)
    #[arg(long)]
    pub channel: Option<String>,

    /// Branch code (e.g. BC)
    #[arg(long)]
    pub branch: Option<String>,

    /// Open the channel/branch management menu
    #[arg(long)]
    pub manage: bool,

    /// List channels and branches, then exit
    #[arg(long)]
    pub list_channels: bool,

    /// Don't stop early when ENTER is pressed
    #[arg(long)]
    pub no_interactive_stop: bool,

    /// Upload frames to Google Drive while capturing
    #[arg(long)]
    pub upload: bool,

    /// Don't renumber existing frames before capturing
    #[arg(long)]
    pub no_auto_sort: bool,

    /// Apply a saved preset before the other options
    #[arg(long)]
    pub preset: Option<String>,

    /// Save the effective capture settings as the new defaults
    #[arg(long)]
    pub remember: bool,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

/// Channel/branch selection shared by folder subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Selection {
    /// Channel key (asked interactively when omitted)
    #[arg(long)]
    pub channel: Option<String>,

    /// Branch code (asked interactively when omitted)
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List attached devices
    Devices,
    /// Renumber a branch folder into 1..N
    Sort {
        #[command(flatten)]
        selection: Selection,
    },
    /// Show frame counts, sizes and numbering gaps
    Stats {
        /// Channel key (all channels when omitted)
        #[arg(long)]
        channel: Option<String>,
        /// Branch code (all branches when omitted)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Upload every frame of a branch folder to Google Drive
    Upload {
        #[command(flatten)]
        selection: Selection,
    },
    /// Capture presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Google Drive settings and statistics
    Drive {
        #[command(subcommand)]
        action: DriveAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PresetAction {
    /// Save the current capture settings under a name
    Save { name: String },
    /// List saved presets
    List,
    /// Show a preset
    Show { name: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DriveAction {
    /// Show upload settings and statistics
    Status,
    /// Zero the upload statistics
    ResetStats,
    /// Change upload settings
    Set {
        #[arg(long)]
        auto_upload: Option<Toggle>,
        /// Root folder name, or id with --root-is-id on
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        root_is_id: Option<Toggle>,
        #[arg(long)]
        date_folders: Option<Toggle>,
        #[arg(long)]
        channel_folders: Option<Toggle>,
        #[arg(long)]
        branch_folders: Option<Toggle>,
        #[arg(long)]
        custom_mapping: Option<Toggle>,
    },
    /// Map a branch code to a Drive folder id
    Map { branch: String, folder_id: String },
    /// Remove a branch mapping
    Unmap { branch: String },
    /// Find or create one folder per branch (named after the branch) and map them
    QuickSetup {
        /// Parent folder id (default: the root folder)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Check that every mapped folder still exists
    Check,
    /// List folders under a parent (default: the root folder)
    Folders {
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// `Some(true)` / `Some(false)` when a numbering flag was given.
    pub fn numbering_override(&self) -> Option<bool> {
        if self.continue_numbering {
            Some(true)
        } else if self.reset_numbering {
            Some(false)
        } else {
            None
        }
    }
}
