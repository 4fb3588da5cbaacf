//! Export processor: resolve inputs, write the script, run the host.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::input_resolver::InputResolver;
use crate::launcher::{HostInvocation, ProcessLauncher};
use crate::models::{ResolvedRequest, RunOutcome, RunRequest};
use crate::scripting::ScriptingEngine;

/// A run that passed validation and has its script on disk.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// The validated request.
    pub request: ResolvedRequest,
    /// Path of the written script.
    pub script_path: PathBuf,
    /// The host invocation that will be launched.
    pub invocation: HostInvocation,
}

impl PreparedRun {
    /// Path of the written script.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

/// Drives a single export run from request to host exit code.
#[derive(Debug, Clone, Default)]
pub struct ExportProcessor {
    launcher: ProcessLauncher,
}

impl ExportProcessor {
    /// Create a processor around a launcher.
    pub fn new(launcher: ProcessLauncher) -> Self {
        Self { launcher }
    }

    /// Create a processor honoring the configured time limit.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(ProcessLauncher::new(config.timeout()))
    }

    /// Resolve, write the script, launch the host and wait for it.
    ///
    /// Nothing is launched unless resolution and the script write both
    /// succeed. The host's exit code is returned as-is, zero or not.
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, ExportError> {
        let prepared = self.prepare(request).await?;
        self.launch(&prepared).await
    }

    /// Validate the request and write its script without launching.
    #[instrument(skip(self, request), fields(project = %request.project_file.display()))]
    pub async fn prepare(&self, request: RunRequest) -> Result<PreparedRun, ExportError> {
        let resolved = InputResolver::resolve(request).await?;
        let script_path = ScriptingEngine::write_script(&resolved).await?;
        let invocation = HostInvocation::new(&resolved, &script_path);

        info!(
            host = %resolved.host_executable().display(),
            script = %script_path.display(),
            output = %resolved.output_artifact().display(),
            "Export run prepared"
        );

        Ok(PreparedRun {
            request: resolved,
            script_path,
            invocation,
        })
    }

    /// Launch the host for a prepared run.
    #[instrument(skip_all, fields(script = %prepared.script_path.display()))]
    pub async fn launch(&self, prepared: &PreparedRun) -> Result<RunOutcome, ExportError> {
        self.launcher.launch(&prepared.invocation).await
    }

    /// The launcher in use.
    pub fn launcher(&self) -> &ProcessLauncher {
        &self.launcher
    }
}
