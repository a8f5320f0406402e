//! Shared types for skill resolution and its command-line host.
//!
//! This crate defines the serializable selection report and the
//! strongly-typed error enums shared across the workspace.

pub mod error;
pub mod selection;

/// Re-export of all error types.
pub use error::*;
/// Re-export of the selection report.
pub use selection::Selection;
