//! Command implementations

pub mod check;
pub mod generate;
pub mod markers;

use std::path::Path;

use serde::Serialize;
use tracing::info;

use declsynth_emit::{CodeEmitter, ManifestEntry};
use declsynth_processors::{Driver, RunSummary};
use declsynth_source::InMemorySymbolSource;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::print_warning;

/// What a synthesis run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub units: Vec<ManifestEntry>,
}

/// Load the graph at `input` and run the standard driver into `emitter`.
pub fn synthesize(
    input: &Path,
    config: &CliConfig,
    emitter: &mut dyn CodeEmitter,
) -> CliResult<RunReport> {
    let mut source = InMemorySymbolSource::from_path(input)?;
    info!(
        input = %input.display(),
        declarations = source.len(),
        emitter = emitter.name(),
        "loaded declaration graph"
    );
    let mut driver = Driver::standard(&config.synthesis, config.driver.clone())?;
    let summary = driver.run(&mut source, emitter)?;
    let units = emitter
        .emitted()
        .into_iter()
        .map(ManifestEntry::from)
        .collect();
    Ok(RunReport { summary, units })
}

fn warn_unresolved(summary: &RunSummary) {
    for name in &summary.unresolved {
        print_warning(&format!("{} never became resolvable", name));
    }
}
