//! Canonical-location chooser port for the presentation layer.

use crate::error::BoxedError;

/// Lets the presentation layer pick the canonical location for a
/// duplicated task.
///
/// A pure request/response seam: the core hands over the candidates and
/// gets back a decision, decoupled from any dialog lifecycle. Returning
/// `Ok(None)` means "no explicit choice" and the plan builder falls back
/// to its default (the currently indexed location).
pub trait CanonicalChooser: Send + Sync {
    /// Chooses the canonical file for `task_id` among `candidates`.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection could not be obtained.
    fn choose_canonical(
        &self,
        task_id: &str,
        candidates: &[String],
    ) -> Result<Option<String>, BoxedError>;
}
