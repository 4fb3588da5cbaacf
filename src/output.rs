//! Text and JSON rendering of the run report.

use std::path::Path;

use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Summary of a finished host run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Host exit code.
    pub exit_code: i32,
    /// Host run time.
    pub elapsed_ms: u64,
    /// Script the host executed.
    pub script: &'a Path,
    /// Where the plugin was told to write.
    pub output: &'a Path,
}

/// Print a run report in the selected format
pub fn print_report(report: &RunReport<'_>, format: OutputFormat) {
    println!("{}", render_report(report, format));
}

fn render_report(report: &RunReport<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "Host exited with code {} after {} ms (script: {}, output: {})",
            report.exit_code,
            report.elapsed_ms,
            report.script.display(),
            report.output.display()
        ),
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to serialize run report");
            "{}".to_string()
        }),
    }
}
