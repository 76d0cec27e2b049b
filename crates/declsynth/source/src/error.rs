//! Error types for the symbol source.

use thiserror::Error;

/// Errors raised while loading or extending a declaration graph.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two declarations share a qualified name.
    #[error("duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// A generated unit declares a type the source cannot read back.
    #[error("cannot absorb generated file {file}: {reason}")]
    GeneratedUnit { file: String, reason: String },
}

/// Result type for symbol source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = SourceError::DuplicateDeclaration("demo.Location".into());
        assert_eq!(e.to_string(), "duplicate declaration: demo.Location");

        let e = SourceError::GeneratedUnit {
            file: "demo/LocationContract.kt".into(),
            reason: "bad type".into(),
        };
        assert!(e.to_string().contains("demo/LocationContract.kt"));
    }

    #[test]
    fn io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "graph.json");
        let e: SourceError = io.into();
        assert!(matches!(e, SourceError::Io(_)));
    }
}
