//! `declsynth check`: a dry run that writes nothing.

use std::path::Path;

use declsynth_emit::MemoryEmitter;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{print_item, print_json, print_success, OutputFormat};

pub fn execute(input: &Path, config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    let mut emitter = MemoryEmitter::new();
    let report = super::synthesize(input, config, &mut emitter)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for unit in &report.units {
                print_item(&unit.path, &format!("from {}", unit.originating.join(", ")));
            }
            super::warn_unresolved(&report.summary);
            print_success(&format!("{} would be generated", report.summary));
        }
    }
    Ok(())
}
