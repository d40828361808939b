// src/fs/mock.rs

//! In-memory [`FileSystem`] with a manually advanced clock, so change
//! detection can be tested without sleeping or touching the disk.

use super::{EntryKind, FileMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        contents: Vec<u8>,
        modified: SystemTime,
    },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    now: SystemTime,
}

#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Ensure root exists
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(MockState {
                entries,
                // Fixed epoch keeps test output deterministic.
                now: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            })),
        }
    }

    /// Current value of the mock clock.
    pub fn now(&self) -> SystemTime {
        self.state.lock().unwrap().now
    }

    /// Move the mock clock forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap();
        state.now += by;
    }

    /// Create or overwrite a file, stamping it with the current mock time.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let modified = state.now;
        state.entries.insert(
            path.clone(),
            MockEntry::File {
                contents: content.into(),
                modified,
            },
        );
        Self::link_into_parent(&mut state.entries, &path);
    }

    /// Override a file's mtime.
    pub fn set_modified(&self, path: impl AsRef<Path>, at: SystemTime) {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified = at;
        }
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if parent == path {
            return; // Avoid infinite loop at root
        }

        if !entries.contains_key(parent) {
            entries.insert(parent.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(entries, parent);
        }

        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File { contents, modified }) => Ok(FileMeta {
                kind: EntryKind::File,
                len: contents.len() as u64,
                modified: *modified,
                mode: Some(0o100644),
            }),
            Some(MockEntry::Dir(_)) => Ok(FileMeta {
                kind: EntryKind::Dir,
                len: 0,
                modified: state.now,
                mode: Some(0o040755),
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File { .. }) => {}
            Some(MockEntry::Dir(_)) => return Err(anyhow!("Is a directory: {:?}", path)),
            None => return Err(anyhow!("File not found: {:?}", path)),
        }
        state.entries.remove(path);

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            state.entries.get_mut(&parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            children.retain(|c| c != name);
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(_)) => Ok(()),
            Some(MockEntry::File { .. }) => Err(anyhow!("Not a directory: {:?}", path)),
            None => {
                state
                    .entries
                    .insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
                Self::link_into_parent(&mut state.entries, path);
                Ok(())
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
