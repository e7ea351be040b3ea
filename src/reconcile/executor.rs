//! Plan execution: backed-up, audited, best-effort document mutation.

use std::collections::HashSet;
use std::path::Path;

use serde_json::json;
use tracing::warn;

use crate::audit::{backup_path_for, AuditAction, AuditEntry, AuditLog, Origin};
use crate::context::ReconcilerContext;
use crate::error::ReconcileError;
use crate::index::DurableIndex;

use super::plan::{ActionKind, DuplicatePlan, PlanAction};

/// What one `apply` call did: the audit entry it recorded plus warnings
/// for every action that failed.
#[derive(Debug)]
pub struct ApplyReport {
    /// The entry appended to the audit journal.
    pub entry: AuditEntry,
    /// Human-readable descriptions of failed actions and bookkeeping
    /// problems, in occurrence order. Empty on a clean run.
    pub warnings: Vec<String>,
}

/// Executes remediation plans in order, recording one audit entry.
///
/// Per `Delete` action: read the source document, snapshot it to an
/// immutable backup, cut the task's line range, write the document back,
/// and drop the id mapping from the index. A failing action is logged and
/// reported but does not abort the rest of the plan: re-running
/// detection and planning recomputes whatever remains, so a half-applied
/// plan is a safe intermediate state. `Merge` actions are rejected
/// explicitly. The audit entry is appended even when no action ran, and
/// the index is flushed before returning so callers can report success
/// with durability in hand.
///
/// Only one backup is taken per document per operation: the first
/// snapshot already preserves the document's full pre-operation content.
/// The structure provider is consulted once per action, so line ranges
/// reflect the document as it stands at that point.
pub async fn apply(
    ctx: &ReconcilerContext,
    index: &DurableIndex,
    journal: &AuditLog,
    plans: &[DuplicatePlan],
    origin: Origin,
) -> ApplyReport {
    let at = ctx.clock.now();
    let mut entry = AuditEntry {
        op_id: ctx.id_gen.generate_id(),
        ts: at,
        user_action: origin,
        description: Some(format!("collapse {} duplicate group(s)", plans.len())),
        backups: Vec::new(),
        actions: Vec::new(),
    };
    let mut warnings = Vec::new();
    let mut backed_up: HashSet<String> = HashSet::new();

    for plan in plans {
        for action in &plan.actions {
            let outcome = match action.kind {
                ActionKind::Keep => Ok(()),
                ActionKind::Merge => Err(ReconcileError::Unsupported(format!(
                    "merge {} from {} into {}",
                    action.task_id, action.from, action.to
                ))),
                ActionKind::Delete => {
                    execute_delete(ctx, index, action, &mut backed_up, &mut entry)
                }
            };
            if let Err(error) = outcome {
                warn!(
                    file = %action.from,
                    task_id = %action.task_id,
                    %error,
                    "plan action failed, continuing with remaining actions"
                );
                warnings.push(format!("{} in {}: {error}", action.task_id, action.from));
            }
        }
    }

    if let Err(error) = journal.append(entry.clone()) {
        warn!(%error, "audit journal append failed; applied mutations stand");
        warnings.push(format!("audit journal append failed: {error}"));
    }
    if let Err(error) = index.flush().await {
        warn!(%error, "index flush after plan execution failed");
        warnings.push(format!("index flush failed: {error}"));
    }

    ApplyReport { entry, warnings }
}

/// Runs one `Delete` action: read, backup, cut, write, unindex, record.
fn execute_delete(
    ctx: &ReconcilerContext,
    index: &DurableIndex,
    action: &PlanAction,
    backed_up: &mut HashSet<String>,
    entry: &mut AuditEntry,
) -> Result<(), ReconcileError> {
    let from = Path::new(&action.from);
    let content = ctx
        .storage
        .read_to_string(from)
        .map_err(|e| ReconcileError::io(action.from.clone(), e))?;

    let structure = ctx
        .structure
        .document_structure(from)
        .map_err(|e| ReconcileError::io(action.from.clone(), e))?;
    let item = structure
        .items
        .iter()
        .find(|item| item.task_id.as_deref() == Some(action.task_id.as_str()))
        .ok_or_else(|| {
            ReconcileError::NotFound(format!("task {} in {}", action.task_id, action.from))
        })?;
    let (start, end) = (item.start_line, item.end_line);

    let backup = if backed_up.contains(&action.from) {
        None
    } else {
        let backup_path = backup_path_for(&action.from, entry.ts);
        ctx.storage
            .create(Path::new(&backup_path), &content)
            .map_err(|e| ReconcileError::io(backup_path.clone(), e))?;
        backed_up.insert(action.from.clone());
        Some(backup_path)
    };

    let updated = remove_line_range(&content, start, end);
    ctx.storage
        .write(from, &updated)
        .map_err(|e| ReconcileError::io(action.from.clone(), e))?;

    index.remove_task_from_file(&action.from, &action.task_id);

    if let Some(backup_path) = &backup {
        entry.backups.push(backup_path.clone());
    }
    entry.actions.push(AuditAction {
        action_type: "delete".to_string(),
        file: action.from.clone(),
        details: Some(json!({
            "taskId": action.task_id,
            "to": action.to,
            "startLine": start,
            "endLine": end,
            "backup": backup,
        })),
    });
    Ok(())
}

/// Removes lines `start..=end` (zero-based, inclusive) from `content`.
///
/// An out-of-range start leaves the content untouched; an out-of-range
/// end is clamped to the last line.
fn remove_line_range(content: &str, start: usize, end: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if start >= lines.len() {
        return content.to_string();
    }
    let end = end.min(lines.len() - 1);

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    kept.extend_from_slice(&lines[..start]);
    kept.extend_from_slice(&lines[end + 1..]);
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        FixedChooser, FixedClock, MemStorage, SequentialIdGenerator, StaticStructure,
    };
    use crate::context::ReconcilerContext;
    use crate::hierarchy::ListItemNode;
    use crate::index::FileDetail;
    use crate::ports::structure::DocumentStructure;
    use crate::ports::StorageProvider;
    use crate::reconcile::{build_plan, DuplicateGroup};
    use std::sync::Arc;

    const INDEX_PATH: &str = ".ticksync/index.json";
    const JOURNAL_PATH: &str = ".ticksync/journal.json";
    const EXPECTED_BACKUP: &str = "B.tickticksync-dup-bak-2024-06-15T10-30-00-000Z.bkup";

    fn item(start: usize, end: usize, task_id: Option<&str>) -> ListItemNode {
        ListItemNode { start_line: start, end_line: end, parent: -1, task_id: task_id.map(String::from) }
    }

    fn fixture() -> (ReconcilerContext, Arc<MemStorage>, DurableIndex, AuditLog) {
        let storage = Arc::new(MemStorage::with_files(&[
            ("A.md", "# Inbox\n- [ ] T-1 canonical\n"),
            ("B.md", "# Other\n- [ ] T-1 duplicate\n- [ ] unrelated\n"),
        ]));
        let clock = Arc::new(FixedClock::at("2024-06-15T10:30:00Z"));
        let structure = StaticStructure::new()
            .with(
                "A.md",
                DocumentStructure { headings: Vec::new(), items: vec![item(1, 1, Some("T-1"))] },
            )
            .with(
                "B.md",
                DocumentStructure {
                    headings: Vec::new(),
                    items: vec![item(1, 1, Some("T-1")), item(2, 2, None)],
                },
            );
        let ctx = ReconcilerContext::new(
            clock.clone(),
            storage.clone(),
            Box::new(SequentialIdGenerator::new()),
            Box::new(structure),
            Box::new(FixedChooser("A.md".to_string())),
        );

        let index = DurableIndex::load(
            storage.clone(),
            clock.clone(),
            INDEX_PATH,
        );
        index.set_file_metadata("A.md", FileDetail { task_ids: vec!["T-1".to_string()] });
        index.set_file_metadata("B.md", FileDetail { task_ids: vec!["T-1".to_string()] });

        let journal = AuditLog::new(storage.clone(), JOURNAL_PATH);
        (ctx, storage, index, journal)
    }

    fn group() -> DuplicateGroup {
        DuplicateGroup {
            task_id: "T-1".to_string(),
            paths: vec!["A.md".to_string(), "B.md".to_string()],
        }
    }

    #[tokio::test]
    async fn delete_action_backs_up_mutates_and_unindexes() {
        let (ctx, storage, index, journal) = fixture();
        let plan = build_plan(&index, &group(), Some("A.md"));

        let report = apply(&ctx, &index, &journal, &[plan], Origin::Manual).await;

        assert!(report.warnings.is_empty());
        assert_eq!(
            storage.read_to_string(Path::new("B.md")).unwrap(),
            "# Other\n- [ ] unrelated\n"
        );
        assert_eq!(
            storage.read_to_string(Path::new(EXPECTED_BACKUP)).unwrap(),
            "# Other\n- [ ] T-1 duplicate\n- [ ] unrelated\n"
        );
        assert_eq!(index.get_location("T-1").as_deref(), Some("A.md"));

        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op_id, "op-1");
        assert_eq!(entries[0].backups, vec![EXPECTED_BACKUP]);
        assert_eq!(entries[0].actions.len(), 1);
        assert_eq!(entries[0].actions[0].action_type, "delete");
        assert_eq!(entries[0].actions[0].file, "B.md");
    }

    #[tokio::test]
    async fn backup_is_written_before_the_mutation() {
        let (ctx, storage, index, journal) = fixture();
        let plan = build_plan(&index, &group(), Some("A.md"));

        apply(&ctx, &index, &journal, &[plan], Origin::Manual).await;

        let log = storage.write_log();
        let backup_pos = log.iter().position(|p| p == Path::new(EXPECTED_BACKUP)).unwrap();
        let mutation_pos = log.iter().position(|p| p == Path::new("B.md")).unwrap();
        assert!(backup_pos < mutation_pos);
    }

    #[tokio::test]
    async fn empty_plan_set_still_records_an_audit_entry() {
        let (ctx, storage, index, journal) = fixture();

        let report = apply(&ctx, &index, &journal, &[], Origin::Automatic).await;

        assert!(report.warnings.is_empty());
        assert!(report.entry.backups.is_empty());
        assert!(report.entry.actions.is_empty());
        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_action, Origin::Automatic);
        assert!(!storage.paths().iter().any(|p| p.to_string_lossy().contains("dup-bak")));
    }

    #[tokio::test]
    async fn merge_action_is_rejected_not_skipped() {
        let (ctx, storage, index, journal) = fixture();
        let plan = DuplicatePlan {
            task_id: "T-1".to_string(),
            candidates: vec!["A.md".to_string(), "B.md".to_string()],
            chosen: "A.md".to_string(),
            actions: vec![PlanAction {
                kind: ActionKind::Merge,
                task_id: "T-1".to_string(),
                from: "B.md".to_string(),
                to: "A.md".to_string(),
            }],
        };

        let report = apply(&ctx, &index, &journal, &[plan], Origin::Manual).await;

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unsupported plan action"));
        // No mutation happened and the entry records no action.
        assert_eq!(
            storage.read_to_string(Path::new("B.md")).unwrap(),
            "# Other\n- [ ] T-1 duplicate\n- [ ] unrelated\n"
        );
        assert!(report.entry.actions.is_empty());
    }

    #[tokio::test]
    async fn failed_action_does_not_abort_the_rest_of_the_plan() {
        let (ctx, storage, index, journal) = fixture();
        index.set_file_metadata("missing.md", FileDetail { task_ids: vec!["T-1".to_string()] });

        let bad = PlanAction {
            kind: ActionKind::Delete,
            task_id: "T-1".to_string(),
            from: "missing.md".to_string(),
            to: "A.md".to_string(),
        };
        let good = PlanAction {
            kind: ActionKind::Delete,
            task_id: "T-1".to_string(),
            from: "B.md".to_string(),
            to: "A.md".to_string(),
        };
        let plan = DuplicatePlan {
            task_id: "T-1".to_string(),
            candidates: vec!["A.md".to_string(), "B.md".to_string(), "missing.md".to_string()],
            chosen: "A.md".to_string(),
            actions: vec![bad, good],
        };

        let report = apply(&ctx, &index, &journal, &[plan], Origin::Manual).await;

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("missing.md"));
        // The good action still ran.
        assert_eq!(
            storage.read_to_string(Path::new("B.md")).unwrap(),
            "# Other\n- [ ] unrelated\n"
        );
        assert_eq!(report.entry.actions.len(), 1);
    }

    #[tokio::test]
    async fn one_backup_per_document_per_operation() {
        let storage = Arc::new(MemStorage::with_files(&[
            ("A.md", "- [ ] T-2 canonical\n- [ ] T-1 canonical\n"),
            ("B.md", "- [ ] T-2 dup\n- [ ] T-1 dup\n"),
        ]));
        let clock = Arc::new(FixedClock::at("2024-06-15T10:30:00Z"));
        // T-1 sits below T-2, so deleting T-1 first leaves T-2's range valid.
        let structure = StaticStructure::new().with(
            "B.md",
            DocumentStructure {
                headings: Vec::new(),
                items: vec![item(0, 0, Some("T-2")), item(1, 1, Some("T-1"))],
            },
        );
        let ctx = ReconcilerContext::new(
            clock.clone(),
            storage.clone(),
            Box::new(SequentialIdGenerator::new()),
            Box::new(structure),
            Box::new(FixedChooser("A.md".to_string())),
        );
        let index = DurableIndex::load(
            storage.clone(),
            clock.clone(),
            INDEX_PATH,
        );
        index.set_file_metadata(
            "A.md",
            FileDetail { task_ids: vec!["T-1".to_string(), "T-2".to_string()] },
        );
        index.set_file_metadata(
            "B.md",
            FileDetail { task_ids: vec!["T-1".to_string(), "T-2".to_string()] },
        );
        let journal = AuditLog::new(storage.clone(), JOURNAL_PATH);

        let plans = vec![
            build_plan(
                &index,
                &DuplicateGroup {
                    task_id: "T-1".to_string(),
                    paths: vec!["A.md".to_string(), "B.md".to_string()],
                },
                Some("A.md"),
            ),
            build_plan(
                &index,
                &DuplicateGroup {
                    task_id: "T-2".to_string(),
                    paths: vec!["A.md".to_string(), "B.md".to_string()],
                },
                Some("A.md"),
            ),
        ];

        let report = apply(&ctx, &index, &journal, &plans, Origin::Manual).await;

        assert!(report.warnings.is_empty());
        assert_eq!(report.entry.backups.len(), 1);
        // The single backup holds the full pre-operation content.
        assert_eq!(
            storage.read_to_string(Path::new(&report.entry.backups[0])).unwrap(),
            "- [ ] T-2 dup\n- [ ] T-1 dup\n"
        );
        assert_eq!(storage.read_to_string(Path::new("B.md")).unwrap(), "");
        assert_eq!(report.entry.actions.len(), 2);
    }

    #[tokio::test]
    async fn journal_append_failure_is_reported_but_mutations_stand() {
        let (ctx, storage, index, _) = fixture();
        storage.write(Path::new(JOURNAL_PATH), "{corrupt").unwrap();
        let journal = AuditLog::new(storage.clone(), JOURNAL_PATH);
        let plan = build_plan(&index, &group(), Some("A.md"));

        let report = apply(&ctx, &index, &journal, &[plan], Origin::Manual).await;

        assert!(report.warnings.iter().any(|w| w.contains("audit journal append failed")));
        // The document mutation was not rolled back.
        assert_eq!(
            storage.read_to_string(Path::new("B.md")).unwrap(),
            "# Other\n- [ ] unrelated\n"
        );
    }

    // --- remove_line_range tests ---

    #[test]
    fn removes_inclusive_line_range() {
        assert_eq!(remove_line_range("a\nb\nc\nd", 1, 2), "a\nd");
    }

    #[test]
    fn preserves_trailing_newline() {
        assert_eq!(remove_line_range("a\nb\nc\n", 1, 1), "a\nc\n");
    }

    #[test]
    fn clamps_end_to_last_line() {
        assert_eq!(remove_line_range("a\nb", 1, 99), "a");
    }

    #[test]
    fn out_of_range_start_is_a_no_op() {
        assert_eq!(remove_line_range("a\nb", 7, 9), "a\nb");
    }
}
