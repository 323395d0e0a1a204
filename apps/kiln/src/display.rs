//! Final result rendering

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use kiln_types::BuildReport;

use crate::error::CliError;

/// Renders the final build report
pub struct OutputRenderer {
    json: bool,
}

impl OutputRenderer {
    /// Create a renderer
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render the report to stdout
    pub fn render_report(&self, report: &BuildReport) -> Result<(), CliError> {
        if self.json {
            let rendered = serde_json::to_string_pretty(report)
                .map_err(|e| CliError::Build(kiln_errors::Error::from(e)))?;
            println!("{rendered}");
            return Ok(());
        }

        println!(
            "{} {} installed under {}",
            report.package,
            report.version,
            report.install_root.display()
        );

        let mut stages = Table::new();
        stages
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["stage", "status", "duration"]);
        for record in &report.stages {
            stages.add_row(vec![
                Cell::new(record.stage),
                Cell::new(&record.status),
                Cell::new(format!("{} ms", record.duration_ms)),
            ]);
        }
        println!("{stages}");

        if report.artifacts.is_empty() {
            println!("no library artifacts found in the install tree");
        } else {
            let mut artifacts = Table::new();
            artifacts
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["library", "path"]);
            for artifact in &report.artifacts {
                artifacts.add_row(vec![
                    Cell::new(&artifact.stem),
                    Cell::new(artifact.path.display()),
                ]);
            }
            println!("{artifacts}");
        }

        Ok(())
    }
}
