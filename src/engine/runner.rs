//! engine::runner
//!
//! Migration runner - the single entry point for moving a document
//! between versions.
//!
//! # Architecture
//!
//! Every migration flows through the same lifecycle:
//!
//! ```text
//! Load -> Preflight -> Resolve -> Fold -> Completeness -> Persist
//! ```
//!
//! The fold applies each resolved step's transform in order, feeding every
//! step's output into the next step's input. Persistence happens only after
//! the whole chain has run, and only when the document actually changed, so
//! an untouched file keeps its hand-written formatting.
//!
//! # Invariants
//!
//! - A failed resolution or preflight persists nothing
//! - The soft outcome (`configured: false`) is not an error; the migrated
//!   document is still persisted and the caller decides what to do
//! - [`MigrationRunner::dry_run`] never writes, whatever the outcome

use thiserror::Error;

use crate::core::document::Document;
use crate::core::shape::Shape;
use crate::core::version::Version;
use crate::store::{DocumentStore, StoreError};

use super::resolver::{self, Direction, ResolveError};
use super::step::{DownTransform, StepRegistry};

/// Errors from the migration runner.
///
/// Everything here is fatal: expected-but-absent sections are reported
/// through [`MigrationReport::configured`] instead.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Loading or persisting the document failed.
    #[error("document store: {0}")]
    Store(#[from] StoreError),

    /// No valid chain exists between the two versions.
    #[error("cannot resolve migration chain: {0}")]
    Resolve(#[from] ResolveError),

    /// The document is missing structure every supported version requires.
    #[error("refusing to migrate a corrupt document: {detail}")]
    Corrupt { detail: String },
}

/// What one migration run did.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub from: Version,
    pub to: Version,
    pub direction: Direction,
    /// Boundaries crossed, in application order.
    pub steps: Vec<Version>,
    /// False when a section the target version expects was absent, or the
    /// final document fails the target version's required shape. The
    /// caller's remedy is to prompt for fresh configuration.
    pub configured: bool,
    /// Fingerprint of the document before the chain ran.
    pub before: String,
    /// Fingerprint after.
    pub after: String,
    /// Mismatch description when the completeness check failed.
    pub missing: Option<String>,
}

impl MigrationReport {
    /// Whether the chain changed the document at all.
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// One line per crossed boundary, for diagnostics.
    pub fn summary(&self) -> String {
        if self.steps.is_empty() {
            return format!("{} -> {}: no boundaries to cross", self.from, self.to);
        }
        self.steps
            .iter()
            .enumerate()
            .map(|(i, boundary)| format!("{}. cross {} ({})", i + 1, boundary, self.direction))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Applies migration chains to stored documents.
///
/// The runner owns no document and no store; both arrive per call. The
/// optional preflight shape rejects corrupt documents before any transform
/// runs, and the optional completeness pair downgrades the outcome to
/// not-configured when a document arriving at that version is missing
/// required structure.
pub struct MigrationRunner<'r> {
    registry: &'r StepRegistry,
    preflight: Option<Shape>,
    completeness: Option<(Version, Shape)>,
}

impl<'r> MigrationRunner<'r> {
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self {
            registry,
            preflight: None,
            completeness: None,
        }
    }

    /// Require `shape` of every document before any transform runs.
    ///
    /// A mismatch is [`MigrateError::Corrupt`]: the shape given here must be
    /// one every supported version satisfies, or old documents would be
    /// refused instead of migrated.
    pub fn with_preflight(mut self, shape: Shape) -> Self {
        self.preflight = Some(shape);
        self
    }

    /// Check documents arriving at `version` against `shape` after the
    /// chain has run; a mismatch makes the outcome not-configured.
    pub fn with_completeness(mut self, version: Version, shape: Shape) -> Self {
        self.completeness = Some((version, shape));
        self
    }

    /// Load, migrate, and persist.
    ///
    /// The store is written only when the chain changed the document.
    ///
    /// # Errors
    ///
    /// Any [`MigrateError`] leaves the store untouched, except
    /// [`MigrateError::Store`] from the final save itself.
    pub fn run(
        &self,
        store: &mut dyn DocumentStore,
        from: &Version,
        to: &Version,
    ) -> Result<MigrationReport, MigrateError> {
        let document = store.load()?;
        let (report, migrated) = self.apply(document, from, to)?;
        if report.changed() {
            store.save(&migrated)?;
        }
        Ok(report)
    }

    /// Load and migrate, but never persist.
    pub fn dry_run(
        &self,
        store: &dyn DocumentStore,
        from: &Version,
        to: &Version,
    ) -> Result<MigrationReport, MigrateError> {
        let document = store.load()?;
        let (report, _) = self.apply(document, from, to)?;
        Ok(report)
    }

    /// Run the chain over an in-memory document.
    fn apply(
        &self,
        document: Document,
        from: &Version,
        to: &Version,
    ) -> Result<(MigrationReport, Document), MigrateError> {
        let before = document.fingerprint();

        if let Some(shape) = &self.preflight {
            if let Some(detail) = shape.describe_mismatch(&document) {
                return Err(MigrateError::Corrupt { detail });
            }
        }

        let chain = resolver::resolve(from, to, self.registry)?;
        let direction = chain.direction();

        let mut current = document;
        let mut configured = true;
        let mut crossed = Vec::with_capacity(chain.len());
        for step in chain.steps() {
            let outcome = match direction {
                Direction::Up => (step.up())(current),
                Direction::Down => match step.down() {
                    DownTransform::Invert(transform) => transform(current),
                    // Resolution already refused terminal downgrades; a step
                    // reaching this arm is a registry bug, surfaced as the
                    // same error rather than a panic.
                    DownTransform::Terminal => {
                        return Err(MigrateError::Resolve(ResolveError::TerminalDowngrade {
                            boundary: step.boundary().clone(),
                        }))
                    }
                },
            };
            configured &= outcome.configured;
            current = outcome.document;
            crossed.push(step.boundary().clone());
        }

        let mut missing = None;
        if let Some((version, shape)) = &self.completeness {
            if to == version {
                if let Some(detail) = shape.describe_mismatch(&current) {
                    configured = false;
                    missing = Some(detail);
                }
            }
        }

        let report = MigrationReport {
            from: from.clone(),
            to: to.clone(),
            direction,
            steps: crossed,
            configured,
            before,
            after: current.fingerprint(),
            missing,
        };
        Ok((report, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Value;
    use crate::core::shape::Kind;
    use crate::engine::history;
    use crate::store::MemoryStore;

    fn doc(yaml: &str) -> Document {
        Document::from_yaml(yaml).expect("fixture parses")
    }

    fn v(s: &str) -> Version {
        Version::parse(s).expect("parse")
    }

    fn backend(document: &Document) -> Option<&str> {
        document
            .get("bitcoind")
            .and_then(Value::as_object)
            .and_then(|bitcoind| bitcoind.get("type"))
            .and_then(Value::as_str)
    }

    #[test]
    fn legacy_backend_is_normalized_across_the_whole_chain() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let mut store = MemoryStore::new(doc("bitcoind:\n  type: none\ntor: {}\n"));

        let report = runner
            .run(&mut store, &v("0.13.0"), &history::current_version())
            .expect("run");

        assert!(report.changed());
        assert_eq!(report.direction, Direction::Up);
        assert_eq!(backend(store.document()), Some("internal-proxy"));
    }

    #[test]
    fn watchtower_flags_vanish_crossing_0_14_2_1() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let mut store = MemoryStore::new(doc(
            "bitcoind:\n  type: internal-proxy\ntor: {}\nwatchtower-enabled: true\nwatchtower-client-enabled: false\n",
        ));

        let report = runner
            .run(&mut store, &v("0.14.2"), &v("0.14.2.1"))
            .expect("run");

        assert!(report.configured);
        assert!(!store.document().contains_key("watchtower-enabled"));
        assert!(!store.document().contains_key("watchtower-client-enabled"));
    }

    #[test]
    fn missing_tor_section_is_the_soft_outcome_not_an_error() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let mut store = MemoryStore::new(doc("bitcoind:\n  type: internal\n"));

        let report = runner
            .run(&mut store, &v("0.13.3.0"), &v("0.14.2"))
            .expect("run");

        assert!(!report.configured);
        // The backend rewrite still landed and was persisted
        assert_eq!(backend(store.document()), Some("internal-proxy"));
    }

    #[test]
    fn an_up_to_date_document_is_left_untouched() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let input = doc("bitcoind:\n  type: internal-proxy\ntor: {}\n");
        let mut store = MemoryStore::new(input.clone());

        let report = runner
            .run(
                &mut store,
                &history::current_version(),
                &history::current_version(),
            )
            .expect("run");

        assert!(!report.changed());
        assert!(report.steps.is_empty());
        assert_eq!(*store.document(), input);
    }

    #[test]
    fn terminal_downgrade_fails_without_touching_the_store() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let input = doc("bitcoind:\n  type: internal-proxy\ntor: {}\n");
        let mut store = MemoryStore::new(input.clone());

        let err = runner
            .run(&mut store, &history::current_version(), &v("0.14.2.1"))
            .unwrap_err();

        assert!(matches!(err, MigrateError::Resolve(_)));
        assert_eq!(*store.document(), input);
    }

    #[test]
    fn preflight_rejects_a_corrupt_document() {
        let registry = history::registry().expect("registry");
        let runner =
            MigrationRunner::new(&registry).with_preflight(history::required_backend_shape());
        let input = doc("alias: my-node\n");
        let mut store = MemoryStore::new(input.clone());

        let err = runner
            .run(&mut store, &v("0.13.0"), &history::current_version())
            .unwrap_err();

        assert!(matches!(err, MigrateError::Corrupt { .. }));
        assert_eq!(*store.document(), input);
    }

    #[test]
    fn completeness_check_downgrades_the_outcome_at_its_version() {
        let registry = history::registry().expect("registry");
        let required = Shape::new()
            .field("bitcoind", Kind::Object)
            .field("alias", Kind::String);
        let runner =
            MigrationRunner::new(&registry).with_completeness(history::current_version(), required);
        let mut store = MemoryStore::new(doc("bitcoind:\n  type: internal-proxy\ntor: {}\n"));

        let report = runner
            .run(&mut store, &v("0.15.1"), &history::current_version())
            .expect("run");

        assert!(!report.configured);
        let missing = report.missing.expect("mismatch description");
        assert!(missing.contains("alias"));
    }

    #[test]
    fn completeness_check_is_scoped_to_its_version() {
        let registry = history::registry().expect("registry");
        let required = Shape::new().field("alias", Kind::String);
        let runner =
            MigrationRunner::new(&registry).with_completeness(history::current_version(), required);
        let mut store = MemoryStore::new(doc("bitcoind:\n  type: internal-proxy\ntor: {}\n"));

        // Downgrades to other versions skip the check entirely
        let report = runner
            .run(&mut store, &v("0.15.2"), &v("0.15.1"))
            .expect("run");

        assert!(report.configured);
        assert!(report.missing.is_none());
    }

    #[test]
    fn dry_run_reports_without_persisting() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let input = doc("bitcoind:\n  type: none\ntor: {}\n");
        let mut store = MemoryStore::new(input.clone());

        let report = runner
            .dry_run(&store, &v("0.13.0"), &history::current_version())
            .expect("dry run");

        assert!(report.changed());
        assert_eq!(report.steps.len(), 4);
        assert_eq!(*store.document(), input);

        // A real run over the same store persists the same result
        let persisted = runner
            .run(&mut store, &v("0.13.0"), &history::current_version())
            .expect("run");
        assert_eq!(persisted.after, report.after);
        assert_eq!(backend(store.document()), Some("internal-proxy"));
    }

    #[test]
    fn report_summary_names_each_crossing() {
        let registry = history::registry().expect("registry");
        let runner = MigrationRunner::new(&registry);
        let store = MemoryStore::new(doc("bitcoind:\n  type: internal\ntor: {}\n"));

        let report = runner
            .dry_run(&store, &v("0.13.0"), &v("0.14.2"))
            .expect("dry run");
        let summary = report.summary();
        assert!(summary.contains("1. cross 0.13.3.2 (upgrade)"));
        assert!(summary.contains("2. cross 0.14.2 (upgrade)"));

        let idle = runner
            .dry_run(&store, &v("0.14.2"), &v("0.14.2"))
            .expect("dry run");
        assert!(idle.summary().contains("no boundaries to cross"));
    }
}
