//! Error types for the Kotlin source model.

use thiserror::Error;

/// Errors raised while building Kotlin names and specs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KotlinError {
    /// A dotted name could not be split into package and simple names.
    #[error("invalid name: {0}")]
    InvalidName(String),
}

/// Result type for Kotlin model operations.
pub type KotlinResult<T> = Result<T, KotlinError>;
