//! Command dispatch and handlers.

pub mod duplicates;
pub mod log;
pub mod resolve;
pub mod status;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::AuditLog;
use crate::cli::{Cli, Command};
use crate::context::ReconcilerContext;
use crate::index::DurableIndex;

const DEFAULT_INDEX: &str = ".ticksync/index.json";
const DEFAULT_JOURNAL: &str = ".ticksync/journal.json";

/// Where the persisted index and journal live for this invocation.
pub struct Paths {
    /// Index document path.
    pub index: PathBuf,
    /// Audit journal path.
    pub journal: PathBuf,
}

/// Resolves index/journal locations: CLI flag, then environment
/// (`TICKSYNC_INDEX` / `TICKSYNC_JOURNAL`), then the defaults.
#[must_use]
pub fn resolve_paths(cli: &Cli) -> Paths {
    let index = cli
        .index
        .clone()
        .or_else(|| env::var("TICKSYNC_INDEX").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX));
    let journal = cli
        .journal
        .clone()
        .or_else(|| env::var("TICKSYNC_JOURNAL").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL));
    Paths { index, journal }
}

/// Dispatch a parsed command with a live context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub async fn dispatch(cli: &Cli) -> Result<(), String> {
    let ctx = ReconcilerContext::live();
    dispatch_with_context(cli, &ctx).await
}

/// Dispatch a command with the given context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub async fn dispatch_with_context(cli: &Cli, ctx: &ReconcilerContext) -> Result<(), String> {
    let paths = resolve_paths(cli);
    match &cli.command {
        Command::Status => status::run(ctx, &paths),
        Command::Duplicates => duplicates::run(ctx, &paths),
        Command::Resolve { task_id, keep, dry_run } => {
            resolve::run(ctx, &paths, task_id.as_deref(), keep.as_deref(), *dry_run).await
        }
        Command::Log { limit } => log::run(ctx, &paths, *limit),
    }
}

/// Loads the durable index for this invocation.
pub(crate) fn load_index(ctx: &ReconcilerContext, paths: &Paths) -> DurableIndex {
    DurableIndex::load(Arc::clone(&ctx.storage), Arc::clone(&ctx.clock), paths.index.clone())
}

/// Opens the audit journal for this invocation.
pub(crate) fn open_journal(ctx: &ReconcilerContext, paths: &Paths) -> AuditLog {
    AuditLog::new(Arc::clone(&ctx.storage), paths.journal.clone())
}
