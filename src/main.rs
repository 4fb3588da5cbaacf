//! Plant 3D JSON export entry point.
//!
//! Loads configuration, runs the export once and exits with the host's own
//! exit code. Failures that prevent the host from running exit with a code
//! of our own:
//!
//! | code | meaning                                            |
//! |------|----------------------------------------------------|
//! | 124  | the host outlived the configured timeout           |
//! | 125  | configuration, missing input or filesystem failure |
//! | 126  | the host executable could not be started           |

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use plant_export_core::config::LoggingConfig;
use plant_export_core::AppResult;
use plant_export_core::error::{AppError, ErrorKind};
use plant_export_runner::{ExportConfig, ExportProcessor};

mod cli;
mod output;

use cli::Cli;
use output::{OutputFormat, RunReport};

/// Exit code when the host was killed after the timeout.
const EXIT_TIMEOUT: i32 = 124;
/// Exit code when the run stopped before launching the host.
const EXIT_NOT_LAUNCHED: i32 = 125;
/// Exit code when the host could not be started.
const EXIT_LAUNCH_FAILED: i32 = 126;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ExportConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(EXIT_NOT_LAUNCHED);
        }
    };
    cli.apply(&mut config);

    init_logging(&config.logging);
    log_configuration(&config);

    let code = match run(&config, cli.format).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    };

    std::process::exit(code);
}

/// Run one export and return the host's exit code.
async fn run(config: &ExportConfig, format: OutputFormat) -> AppResult<i32> {
    tracing::info!("Starting plant-export v{}", env!("CARGO_PKG_VERSION"));

    let processor = ExportProcessor::from_config(config);
    let prepared = processor.prepare(config.to_run_request()).await?;
    let outcome = processor.launch(&prepared).await?;

    if !outcome.success() {
        tracing::warn!(exit_code = outcome.exit_code, "Host reported a nonzero exit code");
    }

    output::print_report(
        &RunReport {
            exit_code: outcome.exit_code,
            elapsed_ms: outcome.elapsed_ms,
            script: prepared.script_path(),
            output: prepared.request.output_artifact(),
        },
        format,
    );

    Ok(outcome.exit_code)
}

fn log_configuration(config: &ExportConfig) {
    tracing::info!(
        project = %config.project_xml.display(),
        output = %config.json_out.display(),
        plugin = %config.plugin_dll.display(),
        host = %config.acad_exe.display(),
        workdir = %config.workdir.display(),
        timeout_s = config.timeout_seconds,
        "Export configuration loaded"
    );
}

/// Map a failure that kept the host from finishing to a process exit code.
fn exit_code_for(err: &AppError) -> i32 {
    match err.kind {
        ErrorKind::Timeout => EXIT_TIMEOUT,
        ErrorKind::ExternalService => EXIT_LAUNCH_FAILED,
        _ => EXIT_NOT_LAUNCHED,
    }
}

/// Initialize tracing/logging on stderr
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_for_failures() {
        assert_eq!(exit_code_for(&AppError::timeout("t")), EXIT_TIMEOUT);
        assert_eq!(exit_code_for(&AppError::external_service("x")), EXIT_LAUNCH_FAILED);
        assert_eq!(exit_code_for(&AppError::not_found("p")), EXIT_NOT_LAUNCHED);
        assert_eq!(exit_code_for(&AppError::storage("s")), EXIT_NOT_LAUNCHED);
        assert_eq!(exit_code_for(&AppError::validation("v")), EXIT_NOT_LAUNCHED);
    }
}
