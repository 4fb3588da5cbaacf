//! Configuration for a Plant 3D export run.
//!
//! Values are resolved once at startup from compiled fallbacks, an
//! optional config file and `PLANT_*` environment variables, then never
//! mutated by the orchestration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use plant_export_core::config::{ConfigSources, LoggingConfig};
use plant_export_core::AppResult;
use plant_export_core::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::RunRequest;

/// Prefix of the environment variables read by [`ExportConfig::load`].
pub const ENV_PREFIX: &str = "PLANT";

/// Filename used when the output path names an existing directory.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "plant_export.json";

/// Fallback host executable.
pub const DEFAULT_ACAD_EXE: &str = r"C:\Program Files\Autodesk\AutoCAD 2026\acad.exe";

/// Fallback working directory.
pub const DEFAULT_WORKDIR: &str = r"C:\PlantAutomationRun";

/// Fallback output artifact path.
pub const DEFAULT_JSON_OUT: &str = r"C:\PlantAutomationRun\plant_export.json";

/// Fallback project definition file.
pub const DEFAULT_PROJECT_XML: &str = r"C:\PlantAutomationRun\Project.xml";

/// Plugin location relative to the directory of the running executable.
const DEFAULT_PLUGIN_COMPONENTS: [&str; 5] = [
    "addin",
    "bin",
    "Release",
    "net8.0-windows",
    "PlantJsonExporter.dll",
];

/// Settings for one export run.
///
/// Environment variables map onto fields by name: `PLANT_PROJECT_XML`,
/// `PLANT_JSON_OUT`, `PLANT_PLUGIN_DLL`, `PLANT_ACAD_EXE`, `PLANT_WORKDIR`
/// and `PLANT_TIMEOUT_SECONDS`. The `logging` section can only be set from
/// a config file.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Project definition file passed to the plugin.
    pub project_xml: PathBuf,

    /// Output artifact path, or a directory to place `plant_export.json` in.
    pub json_out: PathBuf,

    /// Plugin binary loaded by the script.
    pub plugin_dll: PathBuf,

    /// CAD host executable.
    pub acad_exe: PathBuf,

    /// Working directory of the host; holds `run.scr`.
    pub workdir: PathBuf,

    /// Optional limit on the host run. Unset waits indefinitely.
    #[validate(range(min = 1, max = 86_400))]
    pub timeout_seconds: Option<u64>,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project_xml: PathBuf::from(DEFAULT_PROJECT_XML),
            json_out: PathBuf::from(DEFAULT_JSON_OUT),
            plugin_dll: default_plugin_dll(),
            acad_exe: PathBuf::from(DEFAULT_ACAD_EXE),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            timeout_seconds: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Plugin path next to the running executable.
fn default_plugin_dll() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    DEFAULT_PLUGIN_COMPONENTS
        .iter()
        .fold(base, |path, component| path.join(component))
}

impl ExportConfig {
    /// Load from the process environment and an optional file.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        Self::from_sources(ConfigSources::new(ENV_PREFIX).with_file(file))
    }

    /// Load using an explicit variable map instead of the process environment.
    pub fn load_with_env(
        file: Option<&Path>,
        vars: plant_export_core::config::EnvMap,
    ) -> AppResult<Self> {
        Self::from_sources(
            ConfigSources::new(ENV_PREFIX)
                .with_file(file)
                .with_env_map(vars),
        )
    }

    fn from_sources(sources: ConfigSources<'_>) -> AppResult<Self> {
        let config: Self = sources.load()?;
        config
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid export configuration: {e}")))?;
        Ok(config)
    }

    /// The output path the plugin is told to write.
    ///
    /// An existing directory gets `plant_export.json` appended; any other
    /// path is returned unchanged. An empty path means the current directory.
    pub fn effective_output_path(&self) -> PathBuf {
        let out = if self.json_out.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.json_out.as_path()
        };
        if out.is_dir() {
            out.join(DEFAULT_OUTPUT_FILE_NAME)
        } else {
            out.to_path_buf()
        }
    }

    /// The configured time limit on the host run.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Build the run request described by this configuration.
    pub fn to_run_request(&self) -> RunRequest {
        RunRequest {
            host_executable: self.acad_exe.clone(),
            project_file: self.project_xml.clone(),
            plugin_binary: self.plugin_dll.clone(),
            output_artifact: self.effective_output_path(),
            working_directory: self.workdir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_export_core::ErrorKind;
    use plant_export_core::config::EnvMap;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        let mut map = EnvMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    #[test]
    fn test_defaults() {
        let config = ExportConfig::load_with_env(None, env(&[])).expect("load");
        assert_eq!(config.acad_exe, PathBuf::from(DEFAULT_ACAD_EXE));
        assert_eq!(config.workdir, PathBuf::from(DEFAULT_WORKDIR));
        assert_eq!(config.json_out, PathBuf::from(DEFAULT_JSON_OUT));
        assert!(config.plugin_dll.ends_with("net8.0-windows/PlantJsonExporter.dll"));
        assert!(config.timeout_seconds.is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ExportConfig::load_with_env(
            None,
            env(&[
                ("PLANT_PROJECT_XML", "/plant/Project.xml"),
                ("PLANT_JSON_OUT", "/out/export.json"),
                ("PLANT_PLUGIN_DLL", "/plant/addin/Exporter.dll"),
                ("PLANT_TIMEOUT_SECONDS", "90"),
            ]),
        )
        .expect("load");
        assert_eq!(config.project_xml, PathBuf::from("/plant/Project.xml"));
        assert_eq!(config.json_out, PathBuf::from("/out/export.json"));
        assert_eq!(config.plugin_dll, PathBuf::from("/plant/addin/Exporter.dll"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ExportConfig::load_with_env(None, env(&[("PLANT_TIMEOUT_SECONDS", "0")]))
            .expect_err("zero timeout");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_file_then_env_precedence() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("plant-export.toml");
        std::fs::write(
            &file,
            "acad_exe = \"/opt/acad/acad\"\nworkdir = \"/file/work\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .expect("write");

        let config =
            ExportConfig::load_with_env(Some(&file), env(&[("PLANT_WORKDIR", "/env/work")]))
                .expect("load");
        assert_eq!(config.acad_exe, PathBuf::from("/opt/acad/acad"));
        assert_eq!(config.workdir, PathBuf::from("/env/work"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_output_directory_gets_default_filename() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = ExportConfig {
            json_out: temp.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(
            config.effective_output_path(),
            temp.path().join(DEFAULT_OUTPUT_FILE_NAME)
        );
        assert_eq!(
            config.to_run_request().output_artifact,
            temp.path().join(DEFAULT_OUTPUT_FILE_NAME)
        );
    }

    #[test]
    fn test_empty_output_means_current_directory() {
        let config = ExportConfig::load_with_env(None, env(&[("PLANT_JSON_OUT", "")]))
            .expect("load");
        assert_eq!(
            config.effective_output_path(),
            Path::new(".").join(DEFAULT_OUTPUT_FILE_NAME)
        );
    }

    #[test]
    fn test_output_file_path_unchanged() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("custom.json");
        let config = ExportConfig {
            json_out: target.clone(),
            ..Default::default()
        };
        assert_eq!(config.effective_output_path(), target);
    }

    #[test]
    fn test_run_request_mapping() {
        let config = ExportConfig {
            project_xml: PathBuf::from("/p/Project.xml"),
            json_out: PathBuf::from("/nonexistent-out/export.json"),
            plugin_dll: PathBuf::from("/p/Exporter.dll"),
            acad_exe: PathBuf::from("/opt/acad"),
            workdir: PathBuf::from("/w"),
            ..Default::default()
        };
        let request = config.to_run_request();
        assert_eq!(request.host_executable, PathBuf::from("/opt/acad"));
        assert_eq!(request.project_file, PathBuf::from("/p/Project.xml"));
        assert_eq!(request.plugin_binary, PathBuf::from("/p/Exporter.dll"));
        assert_eq!(request.output_artifact, PathBuf::from("/nonexistent-out/export.json"));
        assert_eq!(request.working_directory, PathBuf::from("/w"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ExportConfig {
            timeout_seconds: Some(120),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let deser: ExportConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(deser.timeout_seconds, Some(120));
        assert_eq!(deser.acad_exe, config.acad_exe);
    }
}
