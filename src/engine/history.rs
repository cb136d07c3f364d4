//! engine::history
//!
//! The built-in migration history for the Lightning node package whose
//! configuration this tool manages.
//!
//! # Boundaries
//!
//! | Boundary   | Up                                                      | Down                          |
//! |------------|---------------------------------------------------------|-------------------------------|
//! | `0.13.3.2` | backend `internal` becomes `internal-proxy`             | backend forced to `internal`  |
//! | `0.14.2`   | backend `external` becomes `internal-proxy`; legacy keys stripped from `tor` | legacy keys stripped from `tor` |
//! | `0.14.2.1` | backend `none` becomes `internal-proxy`; top-level watchtower flags removed  | nothing to restore            |
//! | `0.15.0`   | retired keys removed from `watchtowers`                 | terminal                      |
//!
//! The `tor` section arrived with `0.14.2`, so both directions of that
//! boundary expect it; a document crossing without one comes out flagged
//! not configured. The watchtower removals are cleanups of optional keys
//! and stay silent when there is nothing to remove.
//!
//! Every rewrite of the backend selector moves toward `internal-proxy`,
//! the only variant every historical value maps to, so upgrade chains
//! starting below `0.14.2.1` converge on it regardless of the variant
//! they carry. Selections made on newer releases are left alone.

use crate::core::document::{Document, Value};
use crate::core::shape::{Kind, Shape};
use crate::core::version::Version;

use super::step::{MigrationStep, RegistryError, StepOutcome, StepRegistry};

/// The release this history is current for.
pub const CURRENT_VERSION: &str = "0.15.4.1";

pub fn current_version() -> Version {
    Version::from_segments([0, 15, 4, 1])
}

/// All known boundaries, oldest first.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateBoundary`] if the table under
/// construction repeats a boundary.
pub fn registry() -> Result<StepRegistry, RegistryError> {
    let mut registry = StepRegistry::new();
    registry.register(MigrationStep::new(
        Version::from_segments([0, 13, 3, 2]),
        up_0_13_3_2,
        down_0_13_3_2,
    ))?;
    registry.register(MigrationStep::new(
        Version::from_segments([0, 14, 2]),
        up_0_14_2,
        down_0_14_2,
    ))?;
    registry.register(MigrationStep::new(
        Version::from_segments([0, 14, 2, 1]),
        up_0_14_2_1,
        down_0_14_2_1,
    ))?;
    registry.register(MigrationStep::terminal_down(
        Version::from_segments([0, 15, 0]),
        up_0_15_0,
    ))?;
    Ok(registry)
}

/// The one shape every supported historical version shares. A document
/// failing this is corrupt, not merely old.
pub fn required_backend_shape() -> Shape {
    Shape::new().nested("bitcoind", Shape::new().field("type", Kind::String))
}

fn backend_guard() -> Shape {
    Shape::new().nested("bitcoind", Shape::new().field("type", Kind::Any))
}

fn backend_parent_guard() -> Shape {
    Shape::new().nested("bitcoind", Shape::new().optional_field("type", Kind::Any))
}

fn tor_guard() -> Shape {
    Shape::new().field("tor", Kind::Object)
}

fn watchtowers_guard() -> Shape {
    Shape::new().field("watchtowers", Kind::Object)
}

/// Rewrite the backend selector from one variant to another, leaving any
/// other value alone.
fn rewrite_backend(mut document: Document, from: &str, to: &str) -> Document {
    if !backend_guard().test(&document) {
        return document;
    }
    if let Some(bitcoind) = document.get_mut("bitcoind").and_then(Value::as_object_mut) {
        if bitcoind.get("type").and_then(Value::as_str) == Some(from) {
            bitcoind.insert("type", Value::String(to.to_string()));
        }
    }
    document
}

/// Set the backend selector unconditionally. Used on the way down across
/// `0.13.3.2`, where every newer variant collapses to `internal`.
fn force_backend(mut document: Document, to: &str) -> Document {
    if !backend_parent_guard().test(&document) {
        return document;
    }
    if let Some(bitcoind) = document.get_mut("bitcoind").and_then(Value::as_object_mut) {
        bitcoind.insert("type", Value::String(to.to_string()));
    }
    document
}

/// Drop the pre-`0.14.2` tor keys that release stopped reading. The `tor`
/// section itself is expected on both sides of the boundary; its absence
/// is the soft outcome, not an error.
fn strip_tor_legacy_keys(mut document: Document) -> StepOutcome {
    if !tor_guard().test(&document) {
        return StepOutcome::not_configured(document);
    }
    if let Some(tor) = document.get_mut("tor").and_then(Value::as_object_mut) {
        tor.remove("use-tor-only");
        tor.remove("stream-isolation");
    }
    StepOutcome::applied(document)
}

fn up_0_13_3_2(document: Document) -> StepOutcome {
    StepOutcome::applied(rewrite_backend(document, "internal", "internal-proxy"))
}

fn down_0_13_3_2(document: Document) -> StepOutcome {
    StepOutcome::applied(force_backend(document, "internal"))
}

fn up_0_14_2(document: Document) -> StepOutcome {
    let document = rewrite_backend(document, "external", "internal-proxy");
    strip_tor_legacy_keys(document)
}

fn down_0_14_2(document: Document) -> StepOutcome {
    strip_tor_legacy_keys(document)
}

fn up_0_14_2_1(mut document: Document) -> StepOutcome {
    document = rewrite_backend(document, "none", "internal-proxy");
    document.remove("watchtower-enabled");
    document.remove("watchtower-client-enabled");
    StepOutcome::applied(document)
}

fn down_0_14_2_1(document: Document) -> StepOutcome {
    StepOutcome::applied(document)
}

fn up_0_15_0(mut document: Document) -> StepOutcome {
    if watchtowers_guard().test(&document) {
        if let Some(watchtowers) = document.get_mut("watchtowers").and_then(Value::as_object_mut) {
            watchtowers.remove("wt-server");
            watchtowers.remove("wt-client");
            watchtowers.remove("add-watchtowers");
        }
    }
    StepOutcome::applied(document)
}
