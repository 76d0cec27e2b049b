//! Error types for the synthesis driver.

use thiserror::Error;

use declsynth_emit::EmitError;
use declsynth_source::SourceError;
use declsynth_types::SynthError;

/// Errors that end a synthesis run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// At least one declaration failed to synthesize during a round.
    #[error("synthesis failed for {} declaration(s):\n{}", .0.len(), list(.0))]
    SynthesisFailed(Vec<SynthError>),

    /// Rounds kept producing new units past the configured limit.
    #[error("round limit of {0} exceeded; generated code keeps producing new input")]
    RoundLimitExceeded(usize),

    /// Declarations that never became resolvable, with `deny_unresolved` set.
    #[error("unresolved declarations after the last round: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    #[error("invalid synthesis configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

fn list(errors: &[SynthError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
