//! # Identity Errors
//!
//! Validation errors raised while constructing component identities.
//! Each variant carries the rejected input so callers can echo it back
//! without guesswork.

use thiserror::Error;

/// Validation errors for the identity newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Category string is not one of the five component categories.
    #[error("invalid component type: \"{0}\" (expected receiver, processor, exporter, extension or connector)")]
    InvalidCategory(String),

    /// Component name is empty or could escape its version directory.
    #[error("invalid component name: \"{0}\" (must be non-empty and contain no path separators)")]
    InvalidComponentName(String),

    /// Version string is not `MAJOR.MINOR.PATCH`.
    #[error("invalid collector version: \"{value}\" ({reason})")]
    InvalidVersion {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
