//! Reconciler context bundling all port trait objects.
//!
//! The context replaces any process-wide singleton: it is constructed once
//! by the caller and passed by reference into each component. Mutable
//! bookkeeping (device identity, remote checkpoints) lives on the
//! [`crate::index::DurableIndex`] as method calls, never in global state.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{LiveClock, LiveIdGenerator, LiveStorage};
use crate::error::BoxedError;
use crate::ports::chooser::CanonicalChooser;
use crate::ports::clock::Clock;
use crate::ports::id_gen::IdGenerator;
use crate::ports::storage::StorageProvider;
use crate::ports::structure::{DocumentStructure, StructureProvider};

/// Bundles all port trait objects into a single context.
///
/// Clock and storage are shared (`Arc`) because the durable index holds
/// its own handles to them for the debounced write-behind flush.
pub struct ReconcilerContext {
    /// Clock for timestamps on backups, audit entries, and index saves.
    pub clock: Arc<dyn Clock>,
    /// Storage for documents, backups, the index, and the journal.
    pub storage: Arc<dyn StorageProvider>,
    /// Generator for operation ids.
    pub id_gen: Box<dyn IdGenerator>,
    /// The host's document parser.
    pub structure: Box<dyn StructureProvider>,
    /// The presentation layer's canonical-location selection.
    pub chooser: Box<dyn CanonicalChooser>,
}

impl ReconcilerContext {
    /// Creates a context from explicit port implementations.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        storage: Arc<dyn StorageProvider>,
        id_gen: Box<dyn IdGenerator>,
        structure: Box<dyn StructureProvider>,
        chooser: Box<dyn CanonicalChooser>,
    ) -> Self {
        Self { clock, storage, id_gen, structure, chooser }
    }

    /// Creates a live context with real adapters for clock, storage, and
    /// id generation.
    ///
    /// The structure port starts unconfigured (every call fails with a
    /// clear message until the host parser is supplied via
    /// [`ReconcilerContext::with_structure`]); the chooser defaults to
    /// "no explicit choice", which lets the plan builder pick the indexed
    /// location.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Arc::new(LiveClock),
            storage: Arc::new(LiveStorage),
            id_gen: Box::new(LiveIdGenerator),
            structure: Box::new(UnconfiguredStructure),
            chooser: Box::new(DefaultChooser),
        }
    }

    /// Replaces the structure provider.
    #[must_use]
    pub fn with_structure(mut self, structure: Box<dyn StructureProvider>) -> Self {
        self.structure = structure;
        self
    }

    /// Replaces the canonical chooser.
    #[must_use]
    pub fn with_chooser(mut self, chooser: Box<dyn CanonicalChooser>) -> Self {
        self.chooser = chooser;
        self
    }
}

// --- Default adapters for ports the host must (or may) supply ---

/// Placeholder parser: fails every call until the host supplies one.
struct UnconfiguredStructure;

impl StructureProvider for UnconfiguredStructure {
    fn document_structure(&self, path: &Path) -> Result<DocumentStructure, BoxedError> {
        Err(format!(
            "no document-structure provider configured (requested {}); \
             supply one with ReconcilerContext::with_structure",
            path.display()
        )
        .into())
    }
}

/// Chooser that never makes an explicit choice, deferring to the plan
/// builder's default canonical location.
struct DefaultChooser;

impl CanonicalChooser for DefaultChooser {
    fn choose_canonical(
        &self,
        _task_id: &str,
        _candidates: &[String],
    ) -> Result<Option<String>, BoxedError> {
        Ok(None)
    }
}
