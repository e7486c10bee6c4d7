//! scrollshot library crate.
//!
//! Captures a scrolling Android screen over `adb` into numbered PNG files,
//! stops when consecutive frames are identical and mirrors the frames to
//! Google Drive in the background.

pub mod capture;
pub mod cli;
pub mod config;
pub mod device;
pub mod drive;
pub mod hasher;
pub mod numbering;
pub mod settings;
