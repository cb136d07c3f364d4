//! Carryover - version-gated migration for service configuration documents
//!
//! Carryover is a single-binary tool that carries a service's stored
//! configuration document across releases: it applies each schema
//! boundary's rewrite in order, refuses downgrades past boundaries with no
//! older equivalent, and validates candidate documents against the current
//! release's rules.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Resolves and applies migration chains across boundaries
//! - [`core`] - Domain types: versions, documents, structural shapes
//! - [`store`] - Locked, atomic persistence for the stored document
//! - [`schema`] - The current release's declared configuration contract
//! - [`validate`] - Rule-based acceptance of candidate configurations
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! Carryover maintains the following invariants:
//!
//! 1. A migration either applies every step in its chain or leaves the
//!    stored document untouched
//! 2. All writes flow through a locked store with atomic replacement
//! 3. A corrupt document is refused, never silently rewritten
//! 4. A rejected candidate surfaces exactly one rule message

pub mod cli;
pub mod core;
pub mod engine;
pub mod schema;
pub mod store;
pub mod ui;
pub mod validate;
