//! check command - validate a candidate configuration

use std::fs;
use std::io::Read as _;

use anyhow::{Context as _, Result};

use super::{error_envelope, result_envelope};
use crate::cli::Context;
use crate::core::document::Document;
use crate::ui::output;
use crate::validate;

/// Validate a candidate document and report either its dependencies or the
/// first violated rule. Both outcomes are envelopes on stdout; only an
/// unreadable input is an error.
pub fn check(ctx: &Context, file: &str) -> Result<()> {
    let raw = read_candidate(file)?;

    let candidate = match Document::from_yaml(&raw) {
        Ok(document) => document,
        Err(err) => {
            println!(
                "{}",
                error_envelope(&format!("malformed candidate configuration: {err}"))
            );
            return Ok(());
        }
    };

    match validate::validate(&candidate) {
        Ok(validated) => {
            output::debug(
                format!(
                    "candidate accepted, depends on {} package(s)",
                    validated.depends_on.len()
                ),
                ctx.verbosity,
            );
            println!("{}", result_envelope(&validated));
        }
        Err(err) => {
            println!("{}", error_envelope(&err.to_string()));
        }
    }
    Ok(())
}

fn read_candidate(file: &str) -> Result<String> {
    if file == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("reading candidate from stdin")?;
        Ok(raw)
    } else {
        fs::read_to_string(file).with_context(|| format!("reading candidate from {file}"))
    }
}
