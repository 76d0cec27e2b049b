//! `declsynth markers`: the marker vocabulary in effect.

use colored::*;
use serde::Serialize;

use declsynth_types::MarkerKind;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{print_item, print_json, OutputFormat};

#[derive(Debug, Serialize)]
pub struct MarkerReport {
    pub marker: String,
    pub names: Vec<String>,
    pub applies_to: &'static str,
    pub parameters: &'static str,
}

pub fn reports(config: &CliConfig) -> Vec<MarkerReport> {
    let vocabulary = config.synthesis.vocabulary();
    MarkerKind::ALL
        .iter()
        .map(|kind| MarkerReport {
            marker: kind.to_string(),
            names: vocabulary.qualified_names(*kind),
            applies_to: kind.target(),
            parameters: kind.parameters(),
        })
        .collect()
}

pub fn execute(config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    let reports = reports(config);
    match format {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.marker.bold());
                print_item("names:", &report.names.join(", "));
                print_item("applies to:", report.applies_to);
                print_item("parameters:", report.parameters);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_configured_package() {
        let mut config = CliConfig::default();
        config.synthesis.marker_package = "org.example.markers".into();
        let reports = reports(&config);
        assert_eq!(reports.len(), MarkerKind::ALL.len());
        let persistence = reports.iter().find(|r| r.marker == "ContentType").unwrap();
        assert_eq!(
            persistence.names,
            [
                "org.example.markers.ContentType",
                "org.example.markers.ContentValue",
                "org.example.markers.ContentObject"
            ]
        );
        assert_eq!(persistence.applies_to, "data class");
    }
}
