//! migrate command - walk a document across schema boundaries

use std::path::Path;

use anyhow::Result;

use super::result_envelope;
use crate::cli::Context;
use crate::core::version::Version;
use crate::engine::{history, MigrationRunner};
use crate::schema;
use crate::store::lock::StoreLock;
use crate::store::FileStore;
use crate::ui::output;

/// Migrate the document at `config` from the version that wrote it to the
/// target version, then report whether the result is fully configured.
pub fn migrate(
    ctx: &Context,
    from: &Version,
    to: Option<&Version>,
    config: &Path,
    dry_run: bool,
) -> Result<()> {
    let registry = history::registry()?;
    let target = to.cloned().unwrap_or_else(history::current_version);
    let runner = MigrationRunner::new(&registry)
        .with_preflight(history::required_backend_shape())
        .with_completeness(history::current_version(), schema::current().required_shape());

    let mut store = FileStore::new(config);

    if dry_run {
        let report = runner.dry_run(&store, from, &target)?;
        output::print(report.summary(), ctx.verbosity);
        if !report.configured {
            output::warn(
                "migrated document would not be fully configured",
                ctx.verbosity,
            );
        }
        return Ok(());
    }

    let _lock = StoreLock::acquire(&store.lock_path())?;
    let report = runner.run(&mut store, from, &target)?;

    output::debug(report.summary(), ctx.verbosity);
    if let Some(missing) = &report.missing {
        output::debug(format!("document is incomplete: {missing}"), ctx.verbosity);
    }
    if !report.configured {
        output::warn("migrated document is not fully configured", ctx.verbosity);
    }

    println!(
        "{}",
        result_envelope(serde_json::json!({ "configured": report.configured }))
    );
    Ok(())
}
