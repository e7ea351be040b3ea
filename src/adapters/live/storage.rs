//! Live storage adapter using `std::fs`.

use std::io::Write as _;
use std::path::Path;

use crate::error::BoxedError;
use crate::ports::storage::StorageProvider;

/// Live storage adapter backed by real disk I/O.
pub struct LiveStorage;

impl StorageProvider for LiveStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, BoxedError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxedError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn create(&self, path: &Path, contents: &str) -> Result<(), BoxedError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}
