//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `ticksync`.
#[derive(Debug, Parser)]
#[command(name = "ticksync", version, about = "Index and reconcile duplicated task records")]
pub struct Cli {
    /// Path of the persisted index document.
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Path of the audit journal.
    #[arg(long, global = true)]
    pub journal: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize the index: documents, tasks, bookkeeping.
    Status,
    /// List task ids indexed in more than one document.
    Duplicates,
    /// Collapse duplicate groups into one canonical location each.
    Resolve {
        /// Only resolve this task id.
        #[arg(long)]
        task_id: Option<String>,
        /// Keep this document as the canonical location.
        #[arg(long)]
        keep: Option<String>,
        /// Print the plans without applying them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show recorded reconciliation operations.
    Log {
        /// Show at most this many of the most recent entries.
        #[arg(long)]
        limit: Option<usize>,
    },
}
