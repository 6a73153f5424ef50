//! Command handlers for the VentureGraph CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod check;
pub mod deals;
pub mod ingest;
pub mod translate;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use check::CheckCommand;
pub use deals::DealsCommand;
pub use ingest::IngestCommand;
pub use translate::TranslateCommand;

use serde::Serialize;
use venturegraph_core::AppResult;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
