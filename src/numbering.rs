//! Sequence numbering for captured frames.
//!
//! Frames are stored as `{number}_{branch}_{channel}.png`. The number is only
//! recorded in the filename, so continuation, renumbering, statistics and the
//! bulk upload scan all go through [`FramePattern`] to agree on what counts
//! as a frame.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of every frame written by the capture loop.
pub const FRAME_EXTENSION: &str = "png";

/// Build the filename for frame `number`.
///
/// Numbers are zero padded to two digits but never wrapped, so frame 100 is
/// `100_...`. Always sort by the parsed number, not by filename.
pub fn frame_file_name(number: u32, branch_code: &str, channel_short: &str) -> String {
    format!(
        "{:02}_{}_{}.{}",
        number, branch_code, channel_short, FRAME_EXTENSION
    )
}

/// A frame file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub number: u32,
    pub file_name: String,
    pub path: PathBuf,
}

/// Matches frame filenames for one (branch, channel) pair.
///
/// Matching is anchored to the whole filename and case-insensitive.
#[derive(Debug, Clone)]
pub struct FramePattern {
    branch_code: String,
    channel_short: String,
    /// Lowercased `_{branch}_{channel}.png` tail.
    suffix: String,
}

impl FramePattern {
    pub fn new(branch_code: &str, channel_short: &str) -> Self {
        let suffix = format!("_{}_{}.{}", branch_code, channel_short, FRAME_EXTENSION).to_lowercase();
        Self {
            branch_code: branch_code.to_string(),
            channel_short: channel_short.to_string(),
            suffix,
        }
    }

    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    pub fn channel_short(&self) -> &str {
        &self.channel_short
    }

    /// Parse the sequence number out of `file_name`, if it is a frame of this pattern.
    pub fn parse(&self, file_name: &str) -> Option<u32> {
        let lower = file_name.to_lowercase();
        let digits = lower.strip_suffix(&self.suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.parse(file_name).is_some()
    }

    /// Filename for `number` under this pattern.
    pub fn file_name(&self, number: u32) -> String {
        frame_file_name(number, &self.branch_code, &self.channel_short)
    }

    /// List matching frames in `dir`, sorted by number (then name).
    ///
    /// A missing directory yields an empty list.
    pub fn scan(&self, dir: &Path) -> io::Result<Vec<FrameFile>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(number) = self.parse(&file_name) {
                frames.push(FrameFile {
                    number,
                    file_name,
                    path: entry.path(),
                });
            }
        }

        frames.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.file_name.cmp(&b.file_name)));
        Ok(frames)
    }
}

/// Frames of (branch, channel) in `dir`, in numeric order.
pub fn list_frames(dir: &Path, branch_code: &str, channel_short: &str) -> io::Result<Vec<FrameFile>> {
    FramePattern::new(branch_code, channel_short).scan(dir)
}

/// Next free sequence number in `dir`: highest existing number plus one.
///
/// Gaps are not filled; `{1, 2, 5}` continues at 6. Returns 1 for a missing
/// or empty directory.
pub fn next_number(dir: &Path, branch_code: &str, channel_short: &str) -> u32 {
    let pattern = FramePattern::new(branch_code, channel_short);
    match pattern.scan(dir) {
        Ok(frames) => frames
            .iter()
            .map(|f| f.number)
            .max()
            .map_or(1, |max| max.saturating_add(1)),
        Err(e) => {
            log::warn!("Failed to read {}: {}", dir.display(), e);
            1
        }
    }
}

/// Result of [`renumber_contiguous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenumberOutcome {
    /// Files actually renamed.
    pub renamed: usize,
    /// Matching files found.
    pub total: usize,
}

/// Rename frames in `dir` into the gapless sequence `1..=N`, keeping their order.
///
/// Nothing is renamed when the numbers already are `1..=N`. A failed rename
/// is logged and skipped; the remaining files are still processed.
///
/// Renames run in ascending order. The frame at rank `k` always has a number
/// `>= k`, and every frame with a smaller rank has already moved, so a target
/// name is never held by a frame that still has to be renamed.
pub fn renumber_contiguous(
    dir: &Path,
    branch_code: &str,
    channel_short: &str,
) -> io::Result<RenumberOutcome> {
    let pattern = FramePattern::new(branch_code, channel_short);
    let frames = pattern.scan(dir)?;
    let total = frames.len();

    let contiguous = frames
        .iter()
        .enumerate()
        .all(|(rank, frame)| frame.number as usize == rank + 1);
    if contiguous {
        return Ok(RenumberOutcome { renamed: 0, total });
    }

    let mut renamed = 0;
    for (rank, frame) in frames.iter().enumerate() {
        let new_number = (rank + 1) as u32;
        if frame.number == new_number {
            // Already in place, possibly under another spelling (`5_` vs `05_`).
            continue;
        }
        let new_name = pattern.file_name(new_number);

        let new_path = dir.join(&new_name);
        if new_path.exists() {
            log::warn!(
                "Not renaming {} -> {}: target already exists",
                frame.file_name,
                new_name
            );
            continue;
        }

        match std::fs::rename(&frame.path, &new_path) {
            Ok(()) => {
                renamed += 1;
                log::info!("Renamed {} -> {}", frame.file_name, new_name);
            }
            Err(e) => {
                log::warn!("Failed to rename {}: {}", frame.file_name, e);
            }
        }
    }

    Ok(RenumberOutcome { renamed, total })
}

/// Summary of the frames stored for one (branch, channel) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FolderStats {
    pub file_count: usize,
    pub total_bytes: u64,
    /// Holes in `1..=max`, i.e. numbers below the highest frame that are absent.
    pub missing_count: usize,
}

impl FolderStats {
    pub fn total_size_mb(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Count frames, their total size and the holes in their numbering.
pub fn folder_stats(dir: &Path, branch_code: &str, channel_short: &str) -> io::Result<FolderStats> {
    let pattern = FramePattern::new(branch_code, channel_short);
    let frames = pattern.scan(dir)?;

    let mut total_bytes = 0u64;
    for frame in &frames {
        match std::fs::metadata(&frame.path) {
            Ok(meta) => total_bytes += meta.len(),
            Err(e) => log::debug!("Skipping size of {}: {}", frame.file_name, e),
        }
    }

    let present: BTreeSet<u32> = frames.iter().map(|f| f.number).collect();
    let missing_count = present
        .iter()
        .next_back()
        .map_or(0, |&max| max as usize - present.len());

    Ok(FolderStats {
        file_count: frames.len(),
        total_bytes,
        missing_count,
    })
}
