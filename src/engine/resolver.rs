//! engine::resolver
//!
//! Chain resolution: which boundaries a migration crosses, and in which
//! direction.
//!
//! # Algorithm
//!
//! Crossing from version `a` to version `b` selects every registered
//! boundary in the half-open window `(min(a, b), max(a, b)]`. A document at
//! a boundary version already has that boundary's schema, so the lower end
//! is exclusive; the upper end is inclusive because reaching it means
//! adopting its schema. Upgrades walk the window ascending with `up`
//! transforms, downgrades descending with `down` transforms, and equal
//! endpoints yield an empty chain.
//!
//! # Invariants
//!
//! - A downgrade window containing a terminal boundary fails here, before
//!   any transform has run; callers never observe partial application.

use thiserror::Error;

use crate::core::version::Version;

use super::step::{MigrationStep, StepRegistry};

/// Which way a chain crosses its boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "upgrade"),
            Direction::Down => write!(f, "downgrade"),
        }
    }
}

/// Errors from chain resolution.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("cannot downgrade across {boundary}: the schema change at this boundary has no older equivalent")]
    TerminalDowngrade { boundary: Version },
}

/// An ordered selection of steps, ready to fold over a document.
#[derive(Debug, Clone)]
pub struct MigrationChain<'a> {
    direction: Direction,
    steps: Vec<&'a MigrationStep>,
}

impl<'a> MigrationChain<'a> {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Steps in application order: ascending boundaries for an upgrade,
    /// descending for a downgrade.
    pub fn steps(&self) -> &[&'a MigrationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Select the steps between `current` and `target` and the direction to
/// apply them in.
///
/// # Errors
///
/// Returns [`ResolveError::TerminalDowngrade`] when the downgrade window
/// contains a terminal boundary. No mutation has happened at that point.
pub fn resolve<'a>(
    current: &Version,
    target: &Version,
    registry: &'a StepRegistry,
) -> Result<MigrationChain<'a>, ResolveError> {
    use std::cmp::Ordering;

    match current.cmp(target) {
        Ordering::Equal => Ok(MigrationChain {
            direction: Direction::Up,
            steps: Vec::new(),
        }),
        Ordering::Less => {
            let steps = registry
                .steps()
                .iter()
                .filter(|step| step.boundary() > current && step.boundary() <= target)
                .collect();
            Ok(MigrationChain {
                direction: Direction::Up,
                steps,
            })
        }
        Ordering::Greater => {
            let mut steps: Vec<&MigrationStep> = registry
                .steps()
                .iter()
                .filter(|step| step.boundary() > target && step.boundary() <= current)
                .collect();
            steps.reverse();
            for step in &steps {
                if step.is_terminal_down() {
                    return Err(ResolveError::TerminalDowngrade {
                        boundary: step.boundary().clone(),
                    });
                }
            }
            Ok(MigrationChain {
                direction: Direction::Down,
                steps,
            })
        }
    }
}
