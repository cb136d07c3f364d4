//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Shape every outcome into the stdout envelope the host parses
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`crate::engine`] and [`crate::validate`] for the real work. Handlers
//! print exactly one JSON envelope on stdout; human-facing detail goes to
//! stderr under the verbosity flags.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::ui::output::{self, Verbosity};

/// Flags shared by every command handler.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. The returned code
/// is the process exit status: 0 for any ordinary outcome, including a
/// rejected candidate, and 1 for refused migrations and environment
/// failures.
pub fn run() -> i32 {
    let cli = Cli::parse_args();
    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    match commands::dispatch(cli.command, &ctx) {
        Ok(()) => 0,
        Err(err) => {
            // Envelope on stdout for the host, full chain on stderr.
            println!("{}", commands::error_envelope(&err.to_string()));
            output::error(format!("{err:#}"));
            1
        }
    }
}
