//! engine::step
//!
//! Migration steps and the boundary registry.
//!
//! # Overview
//!
//! A [`MigrationStep`] sits on one version boundary: the version at which a
//! schema change took effect. It carries a forward transform, applied when a
//! document crosses the boundary ascending, and a backward transform for the
//! descending direction. Where the change retired a concept with no older
//! equivalent, the backward transform is [`DownTransform::Terminal`] and a
//! downgrade across the boundary is refused outright.
//!
//! # Invariants
//!
//! - Registry boundaries are strictly increasing and unique; registration
//!   of a duplicate boundary is an error, not a silent replace.
//! - Transforms are pure functions of the document; all I/O lives in the
//!   runner and store.

use thiserror::Error;

use crate::core::document::Document;
use crate::core::version::Version;

/// What one transform did with the document.
///
/// `configured` is the soft outcome: `false` means a section the target
/// version expects was absent and could not be fabricated, so the caller
/// should prompt for fresh configuration. It never indicates failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub document: Document,
    pub configured: bool,
}

impl StepOutcome {
    /// The transform ran with everything it expected present.
    pub fn applied(document: Document) -> Self {
        Self {
            document,
            configured: true,
        }
    }

    /// A section the target version expects was absent. Edits tied to that
    /// section were skipped; unrelated edits in the same step still apply.
    pub fn not_configured(document: Document) -> Self {
        Self {
            document,
            configured: false,
        }
    }
}

/// A pure document transform for one boundary crossing.
pub type TransformFn = fn(Document) -> StepOutcome;

/// The backward direction of a step.
#[derive(Debug, Clone, Copy)]
pub enum DownTransform {
    /// The change is representable in the older schema.
    Invert(TransformFn),
    /// The change retired a concept; crossing downward is refused.
    Terminal,
}

/// One version boundary with its forward and backward transforms.
#[derive(Debug, Clone)]
pub struct MigrationStep {
    boundary: Version,
    up: TransformFn,
    down: DownTransform,
}

impl MigrationStep {
    /// A step whose schema change can be crossed in both directions.
    pub fn new(boundary: Version, up: TransformFn, down: TransformFn) -> Self {
        Self {
            boundary,
            up,
            down: DownTransform::Invert(down),
        }
    }

    /// A step that cannot be crossed downward.
    pub fn terminal_down(boundary: Version, up: TransformFn) -> Self {
        Self {
            boundary,
            up,
            down: DownTransform::Terminal,
        }
    }

    /// The version at which this schema change took effect.
    pub fn boundary(&self) -> &Version {
        &self.boundary
    }

    pub fn up(&self) -> TransformFn {
        self.up
    }

    pub fn down(&self) -> DownTransform {
        self.down
    }

    pub fn is_terminal_down(&self) -> bool {
        matches!(self.down, DownTransform::Terminal)
    }
}

/// Errors from registry construction.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate migration boundary {boundary}")]
    DuplicateBoundary { boundary: Version },
}

/// The ordered table of migration steps, ascending by boundary.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: Vec<MigrationStep>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a step, keeping the table sorted ascending by boundary.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateBoundary`] if a step already sits
    /// on the same boundary (under zero-padded version equality).
    pub fn register(&mut self, step: MigrationStep) -> Result<(), RegistryError> {
        match self
            .steps
            .binary_search_by(|existing| existing.boundary.cmp(&step.boundary))
        {
            Ok(_) => Err(RegistryError::DuplicateBoundary {
                boundary: step.boundary,
            }),
            Err(position) => {
                self.steps.insert(position, step);
                Ok(())
            }
        }
    }

    /// All steps, ascending by boundary.
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &Version> {
        self.steps.iter().map(MigrationStep::boundary)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
