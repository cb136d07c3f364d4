//! engine
//!
//! The version-gated migration engine.
//!
//! # Architecture
//!
//! A configuration document's schema changes at known version boundaries.
//! Each boundary is a [`step::MigrationStep`] carrying a forward and a
//! backward transform; [`history`] registers the boundaries this package
//! has accumulated; [`resolver`] picks which of them a given version jump
//! crosses and in which direction; [`runner`] folds the selected transforms
//! over the stored document and persists the result.
//!
//! Transforms are pure functions over the document tree. Everything
//! stateful (loading, persisting, locking) stays at the edges, so each
//! boundary is testable on its own.

pub mod history;
pub mod resolver;
pub mod runner;
pub mod step;

// Re-exports for convenience
pub use resolver::{resolve, Direction, MigrationChain, ResolveError};
pub use runner::{MigrateError, MigrationReport, MigrationRunner};
pub use step::{DownTransform, MigrationStep, RegistryError, StepOutcome, StepRegistry, TransformFn};
