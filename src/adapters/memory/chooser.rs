//! Canonical choosers with fixed behavior.

use crate::error::BoxedError;
use crate::ports::chooser::CanonicalChooser;

/// Chooser that always picks the configured path when it is a candidate.
///
/// Falls back to "no choice" when the configured path is not among the
/// candidates, so the plan builder's default applies instead of an
/// impossible selection.
pub struct FixedChooser(pub String);

impl CanonicalChooser for FixedChooser {
    fn choose_canonical(
        &self,
        _task_id: &str,
        candidates: &[String],
    ) -> Result<Option<String>, BoxedError> {
        Ok(candidates.iter().find(|c| **c == self.0).cloned())
    }
}
