//! Document-structure port supplying parsed headings and list items.

use std::path::Path;

use crate::error::BoxedError;
use crate::hierarchy::{Heading, ListItemNode};

/// The parsed structure of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStructure {
    /// Headings ordered by ascending start line.
    pub headings: Vec<Heading>,
    /// Flat list of list items in document order.
    pub items: Vec<ListItemNode>,
}

/// Supplies the parsed structure of documents.
///
/// The core never parses raw text itself; the host's parser sits behind
/// this trait and hands over position ranges only.
pub trait StructureProvider: Send + Sync {
    /// Returns the parsed structure of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    fn document_structure(&self, path: &Path) -> Result<DocumentStructure, BoxedError>;
}
