//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::version::Version;

/// Carryover - version-gated migration for service configuration documents
#[derive(Parser, Debug)]
#[command(name = "cvo")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate a configuration document between releases
    #[command(
        name = "migrate",
        long_about = "Migrate a stored configuration document between releases.\n\n\
            Walks the document across every schema boundary between the version that \
            last wrote it and the target version, applying each boundary's rewrite in \
            order. The result is written back atomically; the file is never left \
            half-migrated. Prints a JSON envelope on stdout reporting whether the \
            migrated document is fully configured.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Upgrade a document written by 0.13.3 to the current release
    cvo migrate --from 0.13.3 --config /data/start9/config.yaml

    # Downgrade to an older release
    cvo migrate --from 0.15.4.1 --to 0.14.3 --config config.yaml

    # See which boundaries would be crossed, without writing
    cvo migrate --from 0.13.3 --dry-run --config config.yaml

READING THE OUTPUT:
    {\"result\":{\"configured\":true}}    document is ready to use
    {\"result\":{\"configured\":false}}   host should re-prompt for settings
    {\"error\":\"...\"}                   migration refused; document untouched"
    )]
    Migrate {
        /// Version that last wrote the document
        #[arg(long, value_name = "VERSION")]
        from: Version,

        /// Target version (defaults to the current release)
        #[arg(long, value_name = "VERSION")]
        to: Option<Version>,

        /// Path to the configuration document
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,

        /// Plan the migration without touching the document
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a candidate configuration document
    #[command(
        name = "check",
        long_about = "Validate a candidate configuration document against the current \
            release's rules.\n\n\
            Reads a fully populated candidate, evaluates the acceptance rules in order, \
            and stops at the first violation. An accepted candidate reports the packages \
            it depends on; a rejected one reports the violated rule's message. Both \
            outcomes are ordinary results and exit 0.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Validate a file
    cvo check candidate.yaml

    # Validate from stdin
    cat candidate.yaml | cvo check

READING THE OUTPUT:
    {\"result\":{\"depends-on\":{\"bitcoind\":[]}}}   accepted
    {\"error\":\"Maximum Channel Size must ...\"}   rejected; show to the user"
    )]
    Check {
        /// Candidate file to validate, or `-` for stdin
        #[arg(default_value = "-")]
        file: String,
    },

    /// Print the current release's configuration contract
    #[command(
        name = "schema",
        long_about = "Print the current release's configuration contract as JSON.\n\n\
            The contract lists every field the host's configuration form renders: \
            types, defaults, numeric ranges, the legal backend variants, and which \
            values are injected from other packages.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Inspect the contract
    cvo schema | jq .

    # Which backend variants are legal right now?
    cvo schema | jq '.bitcoind.tag.\"variant-names\"'"
    )]
    Schema,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for cvo commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    cvo completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    cvo completion zsh >> ~/.zshrc

    # Fish
    cvo completion fish > ~/.config/fish/completions/cvo.fish

    # PowerShell
    cvo completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
