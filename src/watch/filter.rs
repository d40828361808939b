// src/watch/filter.rs

use std::fmt;

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled ignore rules applied identically on every poll.
///
/// A path (relative to the watch root, forward slashes) is ignored when:
/// - any of its components starts with `.` (hidden file or inside a hidden
///   directory), or
/// - its file name ends with one of the excluded suffixes.
#[derive(Clone)]
pub struct WatchFilter {
    suffixes: Vec<String>,
    suffix_set: GlobSet,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("suffixes", &self.suffixes)
            .finish_non_exhaustive()
    }
}

impl WatchFilter {
    /// Compile the excluded suffix set.
    ///
    /// Suffixes are literal (`.pyc`, `~`, `.swp`); glob metacharacters in them
    /// are escaped. An empty suffix is rejected because it would match every
    /// file.
    pub fn new<S: AsRef<str>>(suffixes: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::with_capacity(suffixes.len());

        for suffix in suffixes {
            let suffix = suffix.as_ref();
            if suffix.is_empty() {
                bail!("empty excluded suffix would ignore every file");
            }
            let pattern = format!("*{}", globset::escape(suffix));
            let glob = Glob::new(&pattern)
                .with_context(|| format!("invalid excluded suffix: {suffix}"))?;
            builder.add(glob);
            kept.push(suffix.to_string());
        }

        let suffix_set = builder
            .build()
            .context("building excluded suffix globset")?;

        Ok(Self {
            suffixes: kept,
            suffix_set,
        })
    }

    /// True if `name` (a single path component) is hidden.
    pub fn is_hidden_name(name: &str) -> bool {
        name.starts_with('.') && name != "." && name != ".."
    }

    /// True if the file name carries an excluded suffix.
    pub fn has_excluded_suffix(&self, file_name: &str) -> bool {
        self.suffix_set.is_match(file_name)
    }

    /// Returns true if a change to `rel_path` must never trigger a rerun.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        let mut last = None;
        for component in rel_path.split('/').filter(|c| !c.is_empty()) {
            if Self::is_hidden_name(component) {
                return true;
            }
            last = Some(component);
        }
        match last {
            Some(name) => self.has_excluded_suffix(name),
            None => true,
        }
    }
}
