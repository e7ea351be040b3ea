//! Error taxonomy for the reconciliation core.

use thiserror::Error;

/// Boxed error type returned by port implementations.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the reconciliation core.
///
/// Boundary failures from port adapters are wrapped into this taxonomy so
/// that callers can distinguish a missing document from a storage failure
/// or a malformed persisted structure.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A parent or heading reference that is neither a valid index nor the
    /// recognized root sentinel.
    #[error("ambiguous reference in {file}: {detail}")]
    ParseAmbiguity {
        /// Document the reference came from.
        file: String,
        /// What was out of range and what it resolved to.
        detail: String,
    },

    /// A referenced file or task is missing from storage or the index.
    #[error("not found: {0}")]
    NotFound(String),

    /// A read, write, or create against an external collaborator failed.
    #[error("i/o failure on {path}: {source}")]
    Io {
        /// Path the operation targeted.
        path: String,
        /// Underlying adapter error.
        source: BoxedError,
    },

    /// A loaded index or journal document is missing expected structure.
    #[error("schema mismatch in {path}: {detail}")]
    SchemaMismatch {
        /// Path of the offending document.
        path: String,
        /// Parse or shape failure description.
        detail: String,
    },

    /// A plan action kind that is defined but not executable.
    #[error("unsupported plan action: {0}")]
    Unsupported(String),
}

impl ReconcileError {
    /// Wraps a storage adapter failure with the path it targeted.
    pub fn io(path: impl Into<String>, source: BoxedError) -> Self {
        Self::Io { path: path.into(), source }
    }
}
