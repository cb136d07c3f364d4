//! core
//!
//! Core domain types for the migration engine.
//!
//! # Modules
//!
//! - [`version`] - Dotted version identifiers, total ordering, range predicates
//! - [`document`] - The loosely-typed, insertion-ordered configuration tree
//! - [`shape`] - Structural predicates transforms use to probe documents
//!
//! # Design Principles
//!
//! - Validation happens at construction time; invalid versions cannot exist
//! - Probing a document never panics; absence is an answer, not an error
//! - Key order survives every load/edit/save cycle

pub mod document;
pub mod shape;
pub mod version;

pub use document::{Document, DocumentError, Number, Value};
pub use shape::{Kind, Shape};
pub use version::{Version, VersionError, VersionRange};
