//! Duplicate detection over the durable index.

use std::collections::BTreeMap;

use crate::index::DurableIndex;

/// A task id whose metadata claims more than one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The duplicated task id.
    pub task_id: String,
    /// Distinct paths claiming the id, in path order.
    pub paths: Vec<String>,
}

/// Scans the index for task ids referenced by two or more distinct paths.
///
/// A pure read over the current metadata: recomputed on demand, never
/// persisted. An id repeated within a single document is not a duplicate
/// group; only cross-document claims qualify. Output is ordered by task
/// id, candidate paths by path, so results are stable across runs.
#[must_use]
pub fn find_duplicates(index: &DurableIndex) -> Vec<DuplicateGroup> {
    let snapshot = index.snapshot();

    let mut by_id: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, detail) in &snapshot.file_metadata {
        for task_id in &detail.task_ids {
            let paths = by_id.entry(task_id.clone()).or_default();
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
    }

    by_id
        .into_iter()
        .filter(|(_, paths)| paths.len() >= 2)
        .map(|(task_id, paths)| DuplicateGroup { task_id, paths })
        .collect()
}
