//! Generated units: one rendered source file plus its provenance.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use declsynth_kotlin::FileSpec;
use declsynth_types::QualifiedName;

/// A file-level bundle of synthesized declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub file: FileSpec,
    /// Whether regeneration depends on more than the originating
    /// declarations (for example on the set of sealed subclasses).
    pub aggregating: bool,
    /// Declarations this unit was synthesized from.
    pub originating: Vec<QualifiedName>,
}

impl GeneratedUnit {
    /// An aggregating unit synthesized from a single declaration.
    pub fn new(file: FileSpec, originating: QualifiedName) -> Self {
        Self {
            file,
            aggregating: true,
            originating: vec![originating],
        }
    }

    pub fn with_aggregating(mut self, aggregating: bool) -> Self {
        self.aggregating = aggregating;
        self
    }

    /// Output path relative to the source root.
    pub fn path(&self) -> PathBuf {
        self.file.relative_path()
    }

    pub fn render(&self) -> String {
        self.file.render()
    }

    /// Origins as a comma-separated list, for messages.
    pub fn origin_list(&self) -> String {
        self.originating
            .iter()
            .map(QualifiedName::canonical)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// BLAKE3 fingerprint of rendered source text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        Self(blake3::hash(text.as_bytes()).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.get(..12).unwrap_or(&self.0))
    }
}

/// A unit after rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedUnit {
    pub unit: GeneratedUnit,
    pub text: String,
    pub fingerprint: Fingerprint,
}

impl RenderedUnit {
    pub fn new(unit: GeneratedUnit) -> Self {
        let text = unit.render();
        let fingerprint = Fingerprint::of(&text);
        Self {
            unit,
            text,
            fingerprint,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.unit.path()
    }
}
