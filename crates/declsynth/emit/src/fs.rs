//! Filesystem emitter and output manifest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::emitter::{CodeEmitter, EmitStatus, OutputLedger};
use crate::error::EmitResult;
use crate::unit::{Fingerprint, GeneratedUnit, RenderedUnit};

/// File name of the manifest written next to the generated sources.
pub const MANIFEST_FILE: &str = "declsynth-manifest.json";

/// One manifest entry per generated unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub fingerprint: Fingerprint,
    pub aggregating: bool,
    pub originating: Vec<String>,
}

impl From<&RenderedUnit> for ManifestEntry {
    fn from(unit: &RenderedUnit) -> Self {
        Self {
            path: unit.path().to_string_lossy().replace('\\', "/"),
            fingerprint: unit.fingerprint.clone(),
            aggregating: unit.unit.aggregating,
            originating: unit
                .unit
                .originating
                .iter()
                .map(|name| name.canonical())
                .collect(),
        }
    }
}

/// Everything a run generated, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub units: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> EmitResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Writes generated units below an output directory as
/// `<out>/<package dirs>/<File>.kt`.
#[derive(Debug)]
pub struct FsEmitter {
    root: PathBuf,
    ledger: OutputLedger,
    written: usize,
    skipped: usize,
}

impl FsEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ledger: OutputLedger::default(),
            written: 0,
            skipped: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written to disk so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Files left alone because their content on disk was already current.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn manifest(&self) -> Manifest {
        Manifest {
            units: self.ledger.emitted().into_iter().map(ManifestEntry::from).collect(),
        }
    }

    fn write(&mut self, relative: &Path, text: &str) -> EmitResult<()> {
        let path = self.root.join(relative);
        if std::fs::read_to_string(&path).is_ok_and(|current| current == text) {
            debug!(path = %path.display(), "output up to date");
            self.skipped += 1;
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "wrote output");
        self.written += 1;
        Ok(())
    }
}

impl CodeEmitter for FsEmitter {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn emit(&mut self, unit: GeneratedUnit) -> EmitResult<EmitStatus> {
        let (relative, text) = match self.ledger.record(unit)? {
            Some(rendered) => (rendered.path(), rendered.text.clone()),
            None => return Ok(EmitStatus::Unchanged),
        };
        self.write(&relative, &text)?;
        Ok(EmitStatus::Written)
    }

    fn take_new(&mut self) -> Vec<GeneratedUnit> {
        self.ledger.take_new()
    }

    fn emitted(&self) -> Vec<&RenderedUnit> {
        self.ledger.emitted()
    }

    fn finish(&mut self) -> EmitResult<()> {
        std::fs::create_dir_all(&self.root)?;
        let manifest = self.manifest();
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(self.root.join(MANIFEST_FILE), json + "\n")?;
        info!(
            root = %self.root.display(),
            units = manifest.units.len(),
            written = self.written,
            skipped = self.skipped,
            "output complete"
        );
        Ok(())
    }
}
