//! CLI configuration file.
//!
//! Lookup order: `--config` (or `DECLSYNTH_CONFIG`), `./declsynth.toml`,
//! `<user config dir>/declsynth/declsynth.toml`, built-in defaults. An
//! explicitly named file has to exist; the others are optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use declsynth_processors::{DriverConfig, SynthesisConfig};

use crate::error::{CliError, CliResult};

pub const CONFIG_FILE: &str = "declsynth.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub synthesis: SynthesisConfig,
    pub driver: DriverConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Used when `generate` is run without `--out`.
    pub directory: Option<PathBuf>,
}

impl CliConfig {
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::MissingConfig(path.to_path_buf()));
            }
            return Self::from_path(path);
        }
        let candidates = [
            Some(PathBuf::from(CONFIG_FILE)),
            dirs::config_dir().map(|dir| dir.join("declsynth").join(CONFIG_FILE)),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::from_path(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
