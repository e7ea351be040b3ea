//! `ticksync log`: show recorded operations.

use crate::context::ReconcilerContext;

use super::Paths;

/// Prints recorded reconciliation operations, oldest first.
///
/// # Errors
///
/// Returns an error if the journal cannot be read or parsed.
pub fn run(ctx: &ReconcilerContext, paths: &Paths, limit: Option<usize>) -> Result<(), String> {
    let journal = super::open_journal(ctx, paths);
    let entries = journal.read_all().map_err(|e| e.to_string())?;

    if entries.is_empty() {
        println!("No operations recorded.");
        return Ok(());
    }

    let skip = limit.map_or(0, |limit| entries.len().saturating_sub(limit));
    for entry in &entries[skip..] {
        let origin = match entry.user_action {
            crate::audit::Origin::Manual => "manual",
            crate::audit::Origin::Automatic => "auto",
        };
        println!(
            "{} {} [{origin}] {} action(s), {} backup(s)",
            entry.ts.to_rfc3339(),
            entry.op_id,
            entry.actions.len(),
            entry.backups.len()
        );
        if let Some(description) = &entry.description {
            println!("    {description}");
        }
    }
    Ok(())
}
