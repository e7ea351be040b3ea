//! Storage port for document and index I/O.

use std::path::Path;

use crate::error::BoxedError;

/// Provides access to the document store holding task documents, the
/// persisted index, backups, and the audit journal.
///
/// The core treats every call as an external I/O boundary: failures are
/// caught at the call site and degrade to skip-and-report rather than
/// aborting a whole operation.
pub trait StorageProvider: Send + Sync {
    /// Returns `true` if the path exists in the store.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the entire contents of a document as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String, BoxedError>;

    /// Writes the given contents to a document, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxedError>;

    /// Creates a new document with the given contents.
    ///
    /// Unlike [`StorageProvider::write`] this fails if the target already
    /// exists; backups use it so an existing snapshot is never clobbered.
    ///
    /// # Errors
    ///
    /// Returns an error if the path already exists or the create fails.
    fn create(&self, path: &Path, contents: &str) -> Result<(), BoxedError>;
}
