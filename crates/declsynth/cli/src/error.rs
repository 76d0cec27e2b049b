//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

use declsynth_emit::EmitError;
use declsynth_processors::DriverError;
use declsynth_source::SourceError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file {} does not exist", .0.display())]
    MissingConfig(PathBuf),

    #[error("no output directory: pass --out or set [output] directory in the config file")]
    MissingOutput,

    #[error("cannot load declaration graph: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
