// src/marker.rs

//! Marker files: filesystem timestamps that survive in the scratch directory.
//!
//! - `rerun-check.<pid>` is touched after every command run and is the
//!   baseline for change detection.
//! - `rerun-exec.<pid>` is written once at startup and is the baseline for
//!   self-reload detection.
//!
//! The pid suffix keeps concurrent instances sharing a scratch directory
//! apart. [`MarkerGuard`] removes both files when dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::errors::{RerunError, Result};
use crate::fs::FileSystem;
use crate::types::MarkerKind;
use crate::watch::FileEntry;

/// A single marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    kind: MarkerKind,
    path: PathBuf,
}

impl Marker {
    pub fn new(dir: &Path, kind: MarkerKind, pid: u32) -> Self {
        Self {
            kind,
            path: dir.join(format!("{}.{pid}", kind.stem())),
        }
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the marker or bump its mtime to now.
    ///
    /// The mtime is set by rewriting the file so it comes from the same clock
    /// the filesystem uses for the watched files. Returns the resulting mtime.
    pub fn touch(&self, fs: &dyn FileSystem) -> Result<SystemTime> {
        let stamp: DateTime<Local> = Local::now();
        fs.write(&self.path, format!("{}\n", stamp.to_rfc3339()).as_bytes())
            .map_err(|e| self.error(format!("touch failed: {e:#}")))?;
        self.modified(fs)?
            .ok_or_else(|| self.error("vanished right after touch".to_string()))
    }

    /// Modification time, or `None` if the marker does not exist.
    pub fn modified(&self, fs: &dyn FileSystem) -> Result<Option<SystemTime>> {
        Ok(self.listing(fs)?.map(|entry| entry.modified))
    }

    /// Long-format listing data for the marker itself, if it exists.
    pub fn listing(&self, fs: &dyn FileSystem) -> Result<Option<FileEntry>> {
        if !fs.exists(&self.path) {
            return Ok(None);
        }
        let meta = fs
            .metadata(&self.path)
            .map_err(|e| self.error(format!("stat failed: {e:#}")))?;
        Ok(Some(FileEntry {
            path: self.path.clone(),
            len: meta.len,
            modified: meta.modified,
            mode: meta.mode,
        }))
    }

    /// Remove the marker. Removing a marker that does not exist is a no-op.
    pub fn remove(&self, fs: &dyn FileSystem) -> Result<()> {
        if !fs.exists(&self.path) {
            return Ok(());
        }
        fs.remove_file(&self.path)
            .map_err(|e| self.error(format!("remove failed: {e:#}")))
    }

    fn error(&self, message: String) -> RerunError {
        RerunError::MarkerError {
            path: self.path.clone(),
            message,
        }
    }
}

/// Owns both markers of one process and deletes them on drop.
#[derive(Debug)]
pub struct MarkerGuard {
    fs: Arc<dyn FileSystem>,
    check: Marker,
    exec: Marker,
    started_at: SystemTime,
}

impl MarkerGuard {
    /// Prepare the scratch directory for process `pid`.
    ///
    /// Stale markers left by a previous process with the same pid are removed,
    /// so the first cycle always sees "no marker". The exec marker is then
    /// written and its mtime recorded as the self-reload baseline.
    pub fn create(fs: Arc<dyn FileSystem>, dir: &Path, pid: u32) -> Result<Self> {
        fs.create_dir_all(dir)
            .map_err(|e| RerunError::MarkerError {
                path: dir.to_path_buf(),
                message: format!("scratch directory unusable: {e:#}"),
            })?;

        let check = Marker::new(dir, MarkerKind::Check, pid);
        let exec = Marker::new(dir, MarkerKind::Exec, pid);

        check.remove(fs.as_ref())?;
        exec.remove(fs.as_ref())?;
        let started_at = exec.touch(fs.as_ref())?;

        info!(check = ?check.path(), exec = ?exec.path(), "markers prepared");

        Ok(Self {
            fs,
            check,
            exec,
            started_at,
        })
    }

    pub fn check(&self) -> &Marker {
        &self.check
    }

    pub fn exec(&self) -> &Marker {
        &self.exec
    }

    /// Mtime of the exec marker as written at startup.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

impl Drop for MarkerGuard {
    fn drop(&mut self) {
        for marker in [&self.check, &self.exec] {
            match marker.remove(self.fs.as_ref()) {
                Ok(()) => debug!(kind = %marker.kind(), path = ?marker.path(), "marker removed"),
                Err(err) => warn!(error = %err, "could not remove marker"),
            }
        }
    }
}
