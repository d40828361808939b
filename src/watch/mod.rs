// src/watch/mod.rs

//! Change detection by mtime polling.
//!
//! This module is responsible for:
//! - Compiling the excluded suffix set into a reusable [`WatchFilter`].
//! - Walking the watched tree and collecting files newer than a baseline.
//!
//! It does **not** know about markers or the command; it only answers
//! "which files changed since T?".

pub mod filter;
pub mod path_utils;
pub mod scan;

use std::path::PathBuf;
use std::time::SystemTime;

pub use filter::WatchFilter;
pub use scan::scan_changed;

/// A regular file as seen by one poll, with enough metadata for a
/// long-format listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the watch root, forward slashes.
    pub path: PathBuf,
    pub len: u64,
    pub modified: SystemTime,
    pub mode: Option<u32>,
}
