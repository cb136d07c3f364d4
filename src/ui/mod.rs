//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Message formatting and display
//!
//! # Design
//!
//! All human-facing output goes through this module so that verbosity is
//! handled in one place and standard output stays clean for the JSON
//! envelopes the host consumes.

pub mod output;
