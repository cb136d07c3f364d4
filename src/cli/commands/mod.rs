//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine or validator to do the work
//! 3. Prints a single JSON envelope on stdout
//!
//! Refused migrations and environment failures bubble up as errors and
//! exit 1. A rejected candidate is an ordinary outcome: the rejection
//! rides in the error envelope, but the process exits 0.

mod check;
mod completion;
mod migrate;
mod schema_cmd;

pub use check::check;
pub use completion::completion;
pub use migrate::migrate;
pub use schema_cmd::schema;

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::Command;
use crate::cli::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Migrate {
            from,
            to,
            config,
            dry_run,
        } => migrate::migrate(ctx, &from, to.as_ref(), &config, dry_run),
        Command::Check { file } => check::check(ctx, &file),
        Command::Schema => schema_cmd::schema(),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Wrap a successful payload in the `{"result": ...}` envelope.
pub(crate) fn result_envelope(value: impl Serialize) -> String {
    serde_json::json!({ "result": value }).to_string()
}

/// Wrap a failure message in the `{"error": ...}` envelope.
pub(crate) fn error_envelope(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
