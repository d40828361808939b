// src/watch/scan.rs

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::fs::{EntryKind, FileSystem};
use crate::watch::path_utils::{file_name_str, relative_str};
use crate::watch::{FileEntry, WatchFilter};

/// Collect every regular file under `root` whose mtime is strictly newer than
/// `since`, skipping anything the filter ignores.
///
/// Hidden directories are not descended into. Entries that disappear between
/// listing and stat are skipped; failing to list `root` itself is an error.
/// The result is sorted by path.
pub fn scan_changed(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &WatchFilter,
    since: SystemTime,
) -> Result<Vec<FileEntry>> {
    let mut changed = Vec::new();
    let mut stack: Vec<PathBuf> = Vec::new();

    for path in fs
        .read_dir(root)
        .with_context(|| format!("scanning watch root {:?}", root))?
    {
        stack.push(path);
    }

    while let Some(path) = stack.pop() {
        if WatchFilter::is_hidden_name(&file_name_str(&path)) {
            trace!(?path, "skipping hidden entry");
            continue;
        }

        let meta = match fs.metadata(&path) {
            Ok(meta) => meta,
            Err(err) => {
                debug!(?path, error = %err, "entry vanished during scan");
                continue;
            }
        };

        match meta.kind {
            EntryKind::Dir => match fs.read_dir(&path) {
                Ok(children) => stack.extend(children),
                Err(err) => debug!(?path, error = %err, "could not list directory"),
            },
            EntryKind::File => {
                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                if filter.is_ignored(&rel) {
                    trace!(path = %rel, "ignored by filter");
                    continue;
                }
                if meta.modified > since {
                    debug!(path = %rel, "changed since last run");
                    changed.push(FileEntry {
                        path: PathBuf::from(rel),
                        len: meta.len,
                        modified: meta.modified,
                        mode: meta.mode,
                    });
                }
            }
            EntryKind::Other => {}
        }
    }

    changed.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::DEFAULT_EXCLUDED_SUFFIXES;

    fn filter() -> WatchFilter {
        WatchFilter::new(DEFAULT_EXCLUDED_SUFFIXES).unwrap()
    }

    fn names(entries: &[FileEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn only_strictly_newer_files_are_reported() {
        let fs = MockFileSystem::new();
        fs.add_file("./old.txt", "old");
        let baseline = fs.now();
        fs.add_file("./same.txt", "same"); // same instant as baseline
        fs.advance(Duration::from_secs(1));
        fs.add_file("./src/new.rs", "new");

        let changed = scan_changed(&fs, Path::new("."), &filter(), baseline).unwrap();
        assert_eq!(names(&changed), vec!["src/new.rs"]);
        assert_eq!(changed[0].len, 3);
    }

    #[test]
    fn hidden_and_excluded_files_never_count() {
        let fs = MockFileSystem::new();
        let baseline = fs.now();
        fs.advance(Duration::from_secs(1));
        fs.add_file("./.git/index", "x");
        fs.add_file("./pkg/.swp", "x");
        fs.add_file("./pkg/mod.pyc", "x");
        fs.add_file("./pkg/mod.py", "x");
        fs.add_file("./README", "x");

        let changed = scan_changed(&fs, Path::new("."), &filter(), baseline).unwrap();
        assert_eq!(names(&changed), vec!["README", "pkg/mod.py"]);
    }

    #[test]
    fn mtime_behind_the_baseline_does_not_count() {
        let fs = MockFileSystem::new();
        let before = fs.now();
        fs.advance(Duration::from_secs(5));
        let baseline = fs.now();
        fs.advance(Duration::from_secs(1));
        fs.add_file("./restored.txt", "x");
        fs.add_file("./edited.txt", "x");
        fs.set_modified("./restored.txt", before);

        let changed = scan_changed(&fs, Path::new("."), &filter(), baseline).unwrap();
        assert_eq!(names(&changed), vec!["edited.txt"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let fs = MockFileSystem::new();
        let err = scan_changed(&fs, Path::new("./nope"), &filter(), fs.now()).unwrap_err();
        assert!(format!("{err:#}").contains("scanning watch root"));
    }
}
