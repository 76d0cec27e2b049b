//! `declsynth generate`

use std::path::{Path, PathBuf};

use declsynth_emit::FsEmitter;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{print_item, print_json, print_success, OutputFormat};

pub fn execute(
    input: &Path,
    out: Option<PathBuf>,
    config: &CliConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let root = out
        .or_else(|| config.output.directory.clone())
        .ok_or(CliError::MissingOutput)?;
    let mut emitter = FsEmitter::new(&root);
    let report = super::synthesize(input, config, &mut emitter)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for unit in &report.units {
                print_item("wrote", &unit.path);
            }
            super::warn_unresolved(&report.summary);
            print_success(&format!(
                "generated {} into {} ({} written, {} up to date)",
                report.summary,
                root.display(),
                emitter.written(),
                emitter.skipped()
            ));
        }
    }
    Ok(())
}
