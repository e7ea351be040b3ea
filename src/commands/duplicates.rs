//! `ticksync duplicates`: list duplicate groups.

use crate::context::ReconcilerContext;
use crate::reconcile;

use super::Paths;

/// Prints every task id indexed in more than one document.
///
/// # Errors
///
/// Never fails today; the signature matches the other handlers.
pub fn run(ctx: &ReconcilerContext, paths: &Paths) -> Result<(), String> {
    let index = super::load_index(ctx, paths);
    let groups = reconcile::find_duplicates(&index);

    if groups.is_empty() {
        println!("No duplicates found.");
        return Ok(());
    }
    for group in groups {
        println!("{}: {}", group.task_id, group.paths.join(", "));
    }
    Ok(())
}
