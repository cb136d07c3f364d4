//! completion command - Generate shell completion scripts

use crate::cli::args::{Cli, Shell};
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells, Generator};

/// Generate shell completion scripts.
pub fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => emit(shells::Bash, &mut cmd, &name),
        Shell::Zsh => emit(shells::Zsh, &mut cmd, &name),
        Shell::Fish => emit(shells::Fish, &mut cmd, &name),
        Shell::PowerShell => emit(shells::PowerShell, &mut cmd, &name),
    }

    Ok(())
}

fn emit(shell: impl Generator, cmd: &mut clap::Command, name: &str) {
    generate(shell, cmd, name.to_string(), &mut std::io::stdout());
}
