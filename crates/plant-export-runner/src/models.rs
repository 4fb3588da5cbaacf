//! Domain models: run requests, the parameter environment, run outcomes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable carrying the project file path to the plugin.
pub const PROJECT_XML_VAR: &str = "PLANT_PROJECT_XML";

/// Environment variable carrying the output artifact path to the plugin.
pub const JSON_OUT_VAR: &str = "PLANT_JSON_OUT";

/// The paths describing a single export run, as supplied by the caller.
///
/// Paths may be relative; [`crate::InputResolver`] normalizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// CAD host executable.
    pub host_executable: PathBuf,
    /// Project definition file handed to the plugin.
    pub project_file: PathBuf,
    /// Plugin binary loaded by the script.
    pub plugin_binary: PathBuf,
    /// Where the plugin writes its export.
    pub output_artifact: PathBuf,
    /// Working directory of the host and home of the script.
    pub working_directory: PathBuf,
}

/// A request whose inputs exist and whose directories have been created.
///
/// Only [`crate::InputResolver`] constructs this type, so holding one is
/// proof that validation succeeded. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub(crate) host_executable: PathBuf,
    pub(crate) project_file: PathBuf,
    pub(crate) plugin_binary: PathBuf,
    pub(crate) output_artifact: PathBuf,
    pub(crate) working_directory: PathBuf,
}

impl ResolvedRequest {
    /// Absolute path of the host executable.
    pub fn host_executable(&self) -> &Path {
        &self.host_executable
    }

    /// Absolute path of the project file.
    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    /// Absolute path of the plugin binary.
    pub fn plugin_binary(&self) -> &Path {
        &self.plugin_binary
    }

    /// Absolute path of the output artifact.
    pub fn output_artifact(&self) -> &Path {
        &self.output_artifact
    }

    /// Absolute path of the working directory.
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// The variables added to the host's inherited environment.
    pub fn parameter_environment(&self) -> ParameterEnvironment {
        ParameterEnvironment {
            vars: vec![
                (PROJECT_XML_VAR, self.project_file.clone().into_os_string()),
                (JSON_OUT_VAR, self.output_artifact.clone().into_os_string()),
            ],
        }
    }
}

/// Variables layered on top of the caller's environment for the host.
///
/// This is the only channel for the project and output paths; the
/// automation script never contains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterEnvironment {
    vars: Vec<(&'static str, OsString)>,
}

impl ParameterEnvironment {
    /// Iterate over `(name, value)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OsString)> {
        self.vars.iter().map(|(k, v)| (*k, v))
    }

    /// Look up a single variable.
    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&OsString> {
        self.vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

/// Result of a host run that launched and exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code of the host, passed through unmodified.
    ///
    /// On Unix a signal-terminated host reports `128 + signal`.
    pub exit_code: i32,
    /// Wall-clock duration of the host process.
    pub elapsed_ms: u64,
}

impl RunOutcome {
    /// Whether the host reported success.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
