//! The [`CodeEmitter`] trait and the in-memory emitter.
//!
//! Every emitter is write-once per output path: emitting the same path again
//! is accepted only when the rendered text is byte-identical.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EmitError, EmitResult};
use crate::unit::{GeneratedUnit, RenderedUnit};

/// What happened to an emitted unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitStatus {
    /// First emission of this path.
    Written,
    /// Identical to an earlier emission; nothing changed.
    Unchanged,
}

/// Persists generated units and hands new ones back for resubmission.
pub trait CodeEmitter {
    /// Emitter name, for logging.
    fn name(&self) -> &str;

    /// Persist `unit`. Conflicting output for an already emitted path fails.
    fn emit(&mut self, unit: GeneratedUnit) -> EmitResult<EmitStatus>;

    /// Units first emitted since the last call, in emission order.
    fn take_new(&mut self) -> Vec<GeneratedUnit>;

    /// Every unit emitted so far, in emission order.
    fn emitted(&self) -> Vec<&RenderedUnit>;

    /// Flush any remaining state once the run is complete.
    fn finish(&mut self) -> EmitResult<()>;
}

// ── Ledger ───────────────────────────────────────────────────────────

/// Write-once bookkeeping shared by the emitters.
#[derive(Debug, Default)]
pub(crate) struct OutputLedger {
    units: BTreeMap<PathBuf, RenderedUnit>,
    order: Vec<PathBuf>,
    pending: Vec<GeneratedUnit>,
}

impl OutputLedger {
    /// Record `unit`, returning the rendered unit when the path is new.
    pub(crate) fn record(&mut self, unit: GeneratedUnit) -> EmitResult<Option<&RenderedUnit>> {
        let rendered = RenderedUnit::new(unit);
        let path = rendered.path();
        if let Some(existing) = self.units.get(&path) {
            if existing.text == rendered.text {
                debug!(path = %path.display(), "identical unit already emitted");
                return Ok(None);
            }
            return Err(EmitError::Conflict {
                path: path.display().to_string(),
                existing: existing.unit.origin_list(),
                attempted: rendered.unit.origin_list(),
            });
        }
        self.pending.push(rendered.unit.clone());
        self.order.push(path.clone());
        Ok(Some(&*self.units.entry(path).or_insert(rendered)))
    }

    pub(crate) fn take_new(&mut self) -> Vec<GeneratedUnit> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn emitted(&self) -> Vec<&RenderedUnit> {
        self.order
            .iter()
            .filter_map(|path| self.units.get(path))
            .collect()
    }

    pub(crate) fn get(&self, path: &Path) -> Option<&RenderedUnit> {
        self.units.get(path)
    }
}

// ── Memory Emitter ───────────────────────────────────────────────────

/// Keeps every emitted unit in memory. Used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    ledger: OutputLedger,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered text of the unit at `path`.
    pub fn text(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.ledger.get(path.as_ref()).map(|unit| unit.text.as_str())
    }

    /// Number of distinct units emitted.
    pub fn len(&self) -> usize {
        self.ledger.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.order.is_empty()
    }
}

impl CodeEmitter for MemoryEmitter {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&mut self, unit: GeneratedUnit) -> EmitResult<EmitStatus> {
        match self.ledger.record(unit)? {
            Some(rendered) => {
                debug!(
                    path = %rendered.path().display(),
                    fingerprint = %rendered.fingerprint,
                    "emitted unit"
                );
                Ok(EmitStatus::Written)
            }
            None => Ok(EmitStatus::Unchanged),
        }
    }

    fn take_new(&mut self) -> Vec<GeneratedUnit> {
        self.ledger.take_new()
    }

    fn emitted(&self) -> Vec<&RenderedUnit> {
        self.ledger.emitted()
    }

    fn finish(&mut self) -> EmitResult<()> {
        Ok(())
    }
}
