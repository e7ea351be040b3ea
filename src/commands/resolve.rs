//! `ticksync resolve`: collapse duplicate groups.

use crate::audit::Origin;
use crate::context::ReconcilerContext;
use crate::reconcile::{self, DuplicatePlan};

use super::Paths;

/// Builds plans for the selected duplicate groups and applies them.
///
/// `--keep` is an explicit canonical choice and is honored per group when
/// it is one of the group's candidates; otherwise the configured chooser
/// is consulted, and the plan builder's default decides when neither
/// makes a choice. With `--dry-run` the plans are printed and nothing is
/// touched. Without it the plans run even when empty, so the operation is
/// recorded either way.
///
/// # Errors
///
/// Returns an error if a requested task id is not actually duplicated or
/// the chooser fails.
pub async fn run(
    ctx: &ReconcilerContext,
    paths: &Paths,
    task_id: Option<&str>,
    keep: Option<&str>,
    dry_run: bool,
) -> Result<(), String> {
    let index = super::load_index(ctx, paths);

    let mut groups = reconcile::find_duplicates(&index);
    if let Some(task_id) = task_id {
        groups.retain(|group| group.task_id == task_id);
        if groups.is_empty() {
            return Err(format!("task {task_id} is not duplicated"));
        }
    }

    let mut plans: Vec<DuplicatePlan> = Vec::with_capacity(groups.len());
    for group in &groups {
        let explicit = keep.filter(|k| group.paths.iter().any(|p| p.as_str() == *k));
        let chosen = match explicit {
            Some(path) => Some(path.to_string()),
            None => ctx
                .chooser
                .choose_canonical(&group.task_id, &group.paths)
                .map_err(|e| format!("choosing canonical location for {}: {e}", group.task_id))?,
        };
        plans.push(reconcile::build_plan(&index, group, chosen.as_deref()));
    }

    if dry_run {
        if plans.is_empty() {
            println!("No duplicates to resolve.");
        }
        for plan in &plans {
            println!("{}", reconcile::format_plan(plan));
        }
        return Ok(());
    }

    let journal = super::open_journal(ctx, paths);
    let report = reconcile::apply(ctx, &index, &journal, &plans, Origin::Manual).await;

    println!(
        "Operation {}: {} action(s), {} backup(s).",
        report.entry.op_id,
        report.entry.actions.len(),
        report.entry.backups.len()
    );
    for backup in &report.entry.backups {
        println!("  backup: {backup}");
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
