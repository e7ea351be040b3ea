//! Document ingestion: keeps the durable index current.
//!
//! For one document, ingestion asks the structure port for headings and
//! items, resolves task locations, slices the document content by line
//! range to obtain each task's title and body (no text parsing happens
//! here, only slicing at ranges the parser already produced), collects
//! child ids from the validated parent links, fingerprints the result,
//! and updates the index. Tasks that disappeared from the document are
//! dropped from its metadata.

use std::path::Path;

use tracing::warn;

use crate::checksum::task_fingerprint;
use crate::context::ReconcilerContext;
use crate::error::ReconcileError;
use crate::hierarchy::{self, ParentDiagnostic, TaskLocation};
use crate::index::{DurableIndex, FileDetail, TaskRecord};

/// What ingesting one document changed.
#[derive(Debug)]
pub struct IngestOutcome {
    /// The ingested document path.
    pub path: String,
    /// Resolved task locations, heading annotations included.
    pub locations: Vec<TaskLocation>,
    /// Task ids no longer present in the document, dropped from its
    /// metadata.
    pub removed: Vec<String>,
    /// Parent references that resolved to root because they were out of
    /// range.
    pub diagnostics: Vec<ParentDiagnostic>,
}

/// Ingests one document, updating task records and file metadata.
///
/// Records are only rewritten when the fingerprint or owning path
/// actually changed, so cosmetic re-ingestion is cheap and does not churn
/// the debounced flush.
///
/// # Errors
///
/// Returns an error if the document's structure or content cannot be
/// obtained. Index mutations never fail.
pub fn ingest_document(
    ctx: &ReconcilerContext,
    index: &DurableIndex,
    path: &str,
) -> Result<IngestOutcome, ReconcileError> {
    let structure = ctx
        .structure
        .document_structure(Path::new(path))
        .map_err(|e| ReconcileError::io(path.to_string(), e))?;
    let resolved = hierarchy::resolve(&structure.headings, &structure.items);

    for diagnostic in &resolved.diagnostics {
        warn!(
            file = %path,
            item = diagnostic.item_index,
            raw_parent = diagnostic.raw_parent,
            "unrecognized parent reference treated as root"
        );
    }

    let content = ctx
        .storage
        .read_to_string(Path::new(path))
        .map_err(|e| ReconcileError::io(path.to_string(), e))?;
    let lines: Vec<&str> = content.split('\n').collect();

    let mut observed: Vec<String> = Vec::new();
    let task_items = structure.items.iter().enumerate().filter(|(_, node)| node.task_id.is_some());
    for ((item_index, node), location) in task_items.zip(&resolved.locations) {
        let task_id = location.task_id.clone();

        let start = node.start_line.min(lines.len());
        let end = (node.end_line + 1).min(lines.len());
        let block = &lines[start.min(end)..end];
        let title = block.first().map(|line| line.trim().to_string()).unwrap_or_default();
        let body = block.join("\n");

        let child_ids: Vec<String> = hierarchy::children_of(&structure.items, item_index)
            .into_iter()
            .filter_map(|child| structure.items[child].task_id.clone())
            .collect();

        let checksum = task_fingerprint(&title, &body, &child_ids);
        let changed = index
            .task_record(&task_id)
            .is_none_or(|record| record.checksum != checksum || record.path != path);
        if changed {
            index.upsert_task(TaskRecord {
                id: task_id.clone(),
                title,
                content: body,
                child_ids,
                path: path.to_string(),
                checksum,
            });
        }
        observed.push(task_id);
    }

    let previous = index.file_detail(path).map(|detail| detail.task_ids).unwrap_or_default();
    let removed: Vec<String> =
        previous.into_iter().filter(|id| !observed.contains(id)).collect();
    for task_id in &removed {
        index.remove_task_from_file(path, task_id);
    }
    index.set_file_metadata(path, FileDetail { task_ids: observed });

    Ok(IngestOutcome {
        path: path.to_string(),
        locations: resolved.locations,
        removed,
        diagnostics: resolved.diagnostics,
    })
}
