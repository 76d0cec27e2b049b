//! Synthesis errors.
//!
//! Every variant names the offending declaration by its qualified name. A
//! synthesis error terminates synthesis of that declaration only; the driver
//! collects them and fails the run once the round has finished.

use thiserror::Error;

/// Errors raised while synthesizing code for one declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// The marker is not applicable to this kind of declaration.
    #[error("{marker} is only applicable to {expected}: '{declaration}' is {actual}")]
    UnsupportedKind {
        declaration: String,
        marker: String,
        expected: String,
        actual: String,
    },

    #[error("{marker} is only applicable to sealed classes or sealed interfaces: '{declaration}' is not sealed")]
    NotSealed { declaration: String, marker: String },

    #[error("{marker} does not support generic sealed hierarchies: '{declaration}' declares type parameters")]
    GenericSealed { declaration: String, marker: String },

    #[error("Only data classes may be annotated with @{marker}: '{declaration}' is not a data class")]
    NotAggregate { declaration: String, marker: String },

    #[error("Class '{declaration}' must have at least one property with backing field")]
    NoStoredProperties { declaration: String },

    #[error("Class '{declaration}' maps properties '{first}' and '{second}' to the same column '{column}'")]
    DuplicateColumn {
        declaration: String,
        column: String,
        first: String,
        second: String,
    },

    #[error("Property '{property}' of '{declaration}' would shadow the contract constant {constant}")]
    ReservedConstant {
        declaration: String,
        property: String,
        constant: String,
    },

    #[error("Cases of '{declaration}' produce the accessor '{accessor}' more than once")]
    DuplicateAccessor { declaration: String, accessor: String },

    /// The controller does not yet extend its generated contract.
    #[error("{declaration} must extend {companion}. Add `{companion}` to the supertypes of {simple_name} so it implements the generated contract")]
    MissingCompanion {
        declaration: String,
        companion: String,
        simple_name: String,
    },

    #[error("Method '{method}' of generated model for '{declaration}' must return Unit")]
    NonUnitModelMethod { declaration: String, method: String },

    /// A name generated code would need is not a valid identifier.
    #[error("'{declaration}' cannot be referenced from generated code: {reason}")]
    InvalidName { declaration: String, reason: String },

    #[error("invalid @{marker} on '{declaration}': {reason}")]
    InvalidMarker {
        declaration: String,
        marker: String,
        reason: String,
    },
}

impl SynthError {
    /// Qualified name of the declaration this error is about.
    pub fn declaration(&self) -> &str {
        match self {
            Self::UnsupportedKind { declaration, .. }
            | Self::NotSealed { declaration, .. }
            | Self::GenericSealed { declaration, .. }
            | Self::NotAggregate { declaration, .. }
            | Self::NoStoredProperties { declaration }
            | Self::DuplicateColumn { declaration, .. }
            | Self::ReservedConstant { declaration, .. }
            | Self::DuplicateAccessor { declaration, .. }
            | Self::MissingCompanion { declaration, .. }
            | Self::NonUnitModelMethod { declaration, .. }
            | Self::InvalidName { declaration, .. }
            | Self::InvalidMarker { declaration, .. } => declaration,
        }
    }
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
