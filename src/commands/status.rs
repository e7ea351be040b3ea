//! `ticksync status`: index summary.

use crate::context::ReconcilerContext;
use crate::reconcile;

use super::Paths;

/// Prints a summary of the index: counts, duplicates, bookkeeping.
///
/// # Errors
///
/// Never fails today; the signature matches the other handlers.
pub fn run(ctx: &ReconcilerContext, paths: &Paths) -> Result<(), String> {
    let index = super::load_index(ctx, paths);
    let snapshot = index.snapshot();
    let duplicates = reconcile::find_duplicates(&index);

    println!("Index: {}", paths.index.display());
    println!("  documents: {}", snapshot.file_metadata.len());
    println!("  tasks:     {}", snapshot.tasks.len());
    println!("  duplicated task ids: {}", duplicates.len());
    match snapshot.meta.last_saved {
        Some(saved) => println!("  last saved: {}", saved.to_rfc3339()),
        None => println!("  last saved: never"),
    }
    if let Some(device) = snapshot.meta.device_name {
        println!("  device: {device}");
    }
    Ok(())
}
