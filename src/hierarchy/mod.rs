//! Task-hierarchy resolution over a flat, line-addressed document structure.
//!
//! The structure provider hands the core an ordered list of headings and a
//! flat list of list items, each with a line range and a raw parent
//! reference. This module validates parent links into a tagged
//! [`ParentRef`], annotates every task-bearing item with its nearest
//! enclosing heading, and reports unrecognized parent values as
//! diagnostics instead of guessing their meaning.

use serde::{Deserialize, Serialize};

/// The conventional "no parent" sentinel in raw parent references.
pub const ROOT_PARENT: i64 = -1;

/// A section marker used to contextually group tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// The heading text.
    pub title: String,
    /// First line of the heading's range.
    pub start_line: usize,
    /// Last line of the heading's range.
    pub end_line: usize,
}

/// One parsed list entry in a document, possibly carrying a task marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemNode {
    /// First line of the item's block.
    pub start_line: usize,
    /// Last line of the item's block, children included.
    pub end_line: usize,
    /// Raw parent reference: an index into the flat item list, or a
    /// sentinel. Validated by [`resolve`]; never trusted as-is.
    pub parent: i64,
    /// The task id this item represents, when it carries a task marker.
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Validated parent linkage for a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// The item sits at the root of the document's item forest.
    Root,
    /// The item is nested under the item at this index.
    Item(usize),
}

/// A resolved location for one task-bearing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    /// The task id from the item's marker.
    pub task_id: String,
    /// First line of the task's block.
    pub start_line: usize,
    /// Last line of the task's block.
    pub end_line: usize,
    /// Validated parent linkage.
    pub parent: ParentRef,
    /// Title of the nearest enclosing heading, if any.
    pub heading: Option<String>,
}

/// A parent reference that was neither a valid index nor [`ROOT_PARENT`].
///
/// Such values (fixtures have produced e.g. `-4`) resolve to
/// [`ParentRef::Root`] but are surfaced so callers can log them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentDiagnostic {
    /// Index of the item carrying the bad reference.
    pub item_index: usize,
    /// The raw value observed.
    pub raw_parent: i64,
}

/// Output of [`resolve`]: locations in input order plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHierarchy {
    /// One entry per task-bearing item, preserving input order.
    pub locations: Vec<TaskLocation>,
    /// Parent references that could not be interpreted.
    pub diagnostics: Vec<ParentDiagnostic>,
}

/// Finds the nearest heading at or above the given line.
///
/// `headings` must be sorted by ascending start line. Scans from the last
/// heading backward and returns the first whose start line is ≤ `line`;
/// returns `None` when the line precedes every heading (root level).
#[must_use]
pub fn find_heading_for_line(headings: &[Heading], line: usize) -> Option<&Heading> {
    headings.iter().rev().find(|h| h.start_line <= line)
}

/// Resolves every task-bearing item into a [`TaskLocation`].
///
/// This is a filter-and-annotate pass, not a sort: output order matches
/// input order. Parent references are validated once here; any value that
/// is not `ROOT_PARENT` and not a valid index of a *different* item
/// resolves to [`ParentRef::Root`] and is recorded as a diagnostic
/// (a self-referencing parent would make the item forest cyclic).
#[must_use]
pub fn resolve(headings: &[Heading], items: &[ListItemNode]) -> ResolvedHierarchy {
    let mut locations = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let parent = match validate_parent(index, item.parent, items.len()) {
            Ok(parent) => parent,
            Err(raw_parent) => {
                diagnostics.push(ParentDiagnostic { item_index: index, raw_parent });
                ParentRef::Root
            }
        };

        if let Some(task_id) = &item.task_id {
            let heading =
                find_heading_for_line(headings, item.start_line).map(|h| h.title.clone());
            locations.push(TaskLocation {
                task_id: task_id.clone(),
                start_line: item.start_line,
                end_line: item.end_line,
                parent,
                heading,
            });
        }
    }

    ResolvedHierarchy { locations, diagnostics }
}

/// Returns the indices of items directly nested under `parent_index`.
#[must_use]
pub fn children_of(items: &[ListItemNode], parent_index: usize) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(index, item)| {
            *index != parent_index
                && usize::try_from(item.parent).is_ok_and(|p| p == parent_index)
        })
        .map(|(index, _)| index)
        .collect()
}

fn validate_parent(index: usize, raw: i64, item_count: usize) -> Result<ParentRef, i64> {
    if raw == ROOT_PARENT {
        return Ok(ParentRef::Root);
    }
    match usize::try_from(raw) {
        Ok(parent) if parent < item_count && parent != index => Ok(ParentRef::Item(parent)),
        _ => Err(raw),
    }
}
