//! In-memory storage adapter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::BoxedError;
use crate::ports::storage::StorageProvider;

/// In-memory storage keyed by path.
///
/// Keeps a log of every write target so tests can assert how often (and
/// where) the core actually persisted something; the debounce tests rely
/// on this to show collapsed bursts.
#[derive(Default)]
pub struct MemStorage {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `(path, contents)` pairs.
    #[must_use]
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.files.lock().unwrap();
            for (path, contents) in files {
                map.insert(PathBuf::from(path), (*contents).to_string());
            }
        }
        storage
    }

    /// Returns every path written (via `write` or `create`) so far, in order.
    #[must_use]
    pub fn write_log(&self) -> Vec<PathBuf> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns all stored paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl StorageProvider for MemStorage {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, BoxedError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("file not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxedError> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        self.writes.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn create(&self, path: &Path, contents: &str) -> Result<(), BoxedError> {
        let mut files = self.files.lock().unwrap();
        if files.contains_key(path) {
            return Err(format!("already exists: {}", path.display()).into());
        }
        files.insert(path.to_path_buf(), contents.to_string());
        self.writes.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
