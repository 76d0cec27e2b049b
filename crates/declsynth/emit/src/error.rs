//! Error types for code emission.

use thiserror::Error;

/// Errors raised while persisting generated units.
#[derive(Debug, Error)]
pub enum EmitError {
    /// A unit was emitted twice for the same path with different content.
    #[error("conflicting output for {path}: already emitted by {existing}, now by {attempted}")]
    Conflict {
        path: String,
        existing: String,
        attempted: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for emission operations.
pub type EmitResult<T> = Result<T, EmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display_names_both_origins() {
        let e = EmitError::Conflict {
            path: "demo/DirectionCaseDetection.kt".into(),
            existing: "demo.Direction".into(),
            attempted: "demo.other.Direction".into(),
        };
        let text = e.to_string();
        assert!(text.contains("demo/DirectionCaseDetection.kt"));
        assert!(text.contains("demo.other.Direction"));
    }
}
