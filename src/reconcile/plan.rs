//! Remediation plans for duplicate groups.

use crate::index::DurableIndex;

use super::detector::DuplicateGroup;

/// What a single plan action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Remove the task's block from `from`, leaving `to` canonical.
    Delete,
    /// Leave this location untouched.
    Keep,
    /// Fold variant content from `from` into `to`. Reserved: the executor
    /// rejects it explicitly rather than treating it as a no-op.
    Merge,
}

/// One step of a remediation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanAction {
    /// What to do.
    pub kind: ActionKind,
    /// The duplicated task id.
    pub task_id: String,
    /// Document the action mutates.
    pub from: String,
    /// Canonical document the task survives in.
    pub to: String,
}

/// An ordered remediation plan for one duplicate group.
///
/// Ephemeral: built on demand, consumed once by the executor, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePlan {
    /// The duplicated task id.
    pub task_id: String,
    /// All candidate locations the group offered.
    pub candidates: Vec<String>,
    /// The canonical location every other candidate collapses into.
    pub chosen: String,
    /// Steps in execution order.
    pub actions: Vec<PlanAction>,
}

/// Builds the remediation plan collapsing `group` into one location.
///
/// When `chosen` is `None` the canonical location defaults to whatever
/// the index currently resolves for the id, falling back to the first
/// candidate when the index has no answer. One `Delete` action is emitted
/// per non-chosen candidate, in candidate order.
#[must_use]
pub fn build_plan(
    index: &DurableIndex,
    group: &DuplicateGroup,
    chosen: Option<&str>,
) -> DuplicatePlan {
    let chosen = chosen
        .map(String::from)
        .or_else(|| index.get_location(&group.task_id))
        .or_else(|| group.paths.first().cloned())
        .unwrap_or_default();

    let actions = group
        .paths
        .iter()
        .filter(|candidate| **candidate != chosen)
        .map(|candidate| PlanAction {
            kind: ActionKind::Delete,
            task_id: group.task_id.clone(),
            from: candidate.clone(),
            to: chosen.clone(),
        })
        .collect();

    DuplicatePlan { task_id: group.task_id.clone(), candidates: group.paths.clone(), chosen, actions }
}

/// Formats a plan as a human-readable preview.
#[must_use]
pub fn format_plan(plan: &DuplicatePlan) -> String {
    let mut lines = vec![format!("Task {}: keep {}", plan.task_id, plan.chosen)];
    if plan.actions.is_empty() {
        lines.push("  (nothing to do)".to_string());
    }
    for action in &plan.actions {
        let verb = match action.kind {
            ActionKind::Delete => "DELETE from",
            ActionKind::Keep => "KEEP in",
            ActionKind::Merge => "MERGE from",
        };
        lines.push(format!("  {verb} {}", action.from));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, MemStorage};
    use crate::index::FileDetail;
    use std::sync::Arc;

    fn empty_index() -> DurableIndex {
        DurableIndex::load(
            Arc::new(MemStorage::new()),
            Arc::new(FixedClock::at("2024-06-15T10:30:00Z")),
            ".ticksync/index.json",
        )
    }

    fn group(task_id: &str, paths: &[&str]) -> DuplicateGroup {
        DuplicateGroup {
            task_id: task_id.to_string(),
            paths: paths.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn explicit_choice_wins() {
        let index = empty_index();
        let plan = build_plan(&index, &group("T-1", &["A.md", "B.md", "C.md"]), Some("B.md"));

        assert_eq!(plan.chosen, "B.md");
        assert_eq!(plan.actions.len(), 2);
        assert_eq!(plan.actions[0].from, "A.md");
        assert_eq!(plan.actions[1].from, "C.md");
        assert!(plan.actions.iter().all(|a| a.kind == ActionKind::Delete && a.to == "B.md"));
    }

    #[tokio::test]
    async fn default_choice_is_the_indexed_location() {
        let index = empty_index();
        index.set_file_metadata(
            "B.md",
            FileDetail { task_ids: vec!["T-1".to_string()] },
        );

        let plan = build_plan(&index, &group("T-1", &["A.md", "B.md"]), None);
        assert_eq!(plan.chosen, "B.md");
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].from, "A.md");
        assert_eq!(plan.actions[0].to, "B.md");
        index.flush().await.unwrap();
    }

    #[test]
    fn default_falls_back_to_first_candidate_when_unindexed() {
        let index = empty_index();
        let plan = build_plan(&index, &group("T-1", &["A.md", "B.md"]), None);

        assert_eq!(plan.chosen, "A.md");
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].from, "B.md");
    }

    #[test]
    fn plan_keeps_candidate_list_for_preview() {
        let index = empty_index();
        let plan = build_plan(&index, &group("T-1", &["A.md", "B.md"]), Some("A.md"));
        assert_eq!(plan.candidates, vec!["A.md", "B.md"]);
    }

    #[test]
    fn format_plan_lists_deletions() {
        let index = empty_index();
        let plan = build_plan(&index, &group("T-1", &["A.md", "B.md"]), Some("A.md"));
        let preview = format_plan(&plan);
        assert!(preview.contains("Task T-1: keep A.md"));
        assert!(preview.contains("DELETE from B.md"));
    }
}
