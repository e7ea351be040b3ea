//! Static structure provider serving pre-parsed document structures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::BoxedError;
use crate::ports::structure::{DocumentStructure, StructureProvider};

/// Serves fixed [`DocumentStructure`] values per path.
///
/// Stands in for the host's parser in tests: the structures describe the
/// line layout of the fixture documents held in [`super::MemStorage`].
#[derive(Default)]
pub struct StaticStructure {
    structures: HashMap<PathBuf, DocumentStructure>,
}

impl StaticStructure {
    /// Creates an empty provider; every lookup fails until inserts happen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the structure for a document path.
    #[must_use]
    pub fn with(mut self, path: &str, structure: DocumentStructure) -> Self {
        self.structures.insert(PathBuf::from(path), structure);
        self
    }
}

impl StructureProvider for StaticStructure {
    fn document_structure(&self, path: &Path) -> Result<DocumentStructure, BoxedError> {
        self.structures
            .get(path)
            .cloned()
            .ok_or_else(|| format!("no structure registered for {}", path.display()).into())
    }
}
