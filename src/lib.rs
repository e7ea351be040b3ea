//! Core library entry for the `ticksync` CLI.

pub mod adapters;
pub mod audit;
pub mod checksum;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod index;
pub mod ingest;
pub mod ports;
pub mod reconcile;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command
/// execution fails.
pub async fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli).await
}
