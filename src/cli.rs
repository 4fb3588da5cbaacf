//! Command-line definition.

use std::path::PathBuf;

use clap::Parser;
use plant_export_runner::ExportConfig;

use crate::output::OutputFormat;

/// Export an AutoCAD Plant 3D project to JSON by driving the host in batch mode.
///
/// Values not given on the command line come from `PLANT_*` environment
/// variables, then the config file, then built-in defaults.
#[derive(Debug, Parser)]
#[command(name = "plant-export", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project definition file [env: PLANT_PROJECT_XML]
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Output artifact path or directory [env: PLANT_JSON_OUT]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Plugin binary [env: PLANT_PLUGIN_DLL]
    #[arg(long)]
    pub plugin: Option<PathBuf>,

    /// Host executable [env: PLANT_ACAD_EXE]
    #[arg(long)]
    pub acad: Option<PathBuf>,

    /// Working directory for the host and its script [env: PLANT_WORKDIR]
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Kill the host after this many seconds [env: PLANT_TIMEOUT_SECONDS]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub timeout: Option<u64>,

    /// Run report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut ExportConfig) {
        if let Some(project) = &self.project {
            config.project_xml = project.clone();
        }
        if let Some(output) = &self.output {
            config.json_out = output.clone();
        }
        if let Some(plugin) = &self.plugin {
            config.plugin_dll = plugin.clone();
        }
        if let Some(acad) = &self.acad {
            config.acad_exe = acad.clone();
        }
        if let Some(workdir) = &self.workdir {
            config.workdir = workdir.clone();
        }
        if self.timeout.is_some() {
            config.timeout_seconds = self.timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "plant-export",
            "--project",
            "/p/Project.xml",
            "--timeout",
            "60",
        ]);
        let mut config = ExportConfig {
            workdir: PathBuf::from("/kept"),
            ..Default::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.project_xml, PathBuf::from("/p/Project.xml"));
        assert_eq!(config.timeout_seconds, Some(60));
        assert_eq!(config.workdir, PathBuf::from("/kept"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["plant-export", "--timeout", "0"]).is_err());
    }
}
