//! Host process execution for batch exports.
//!
//! Runs the CAD host as a child process against a generated script, with an
//! explicit working directory and extra environment variables, and reports
//! its exit code.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::ExportError;
use crate::models::{ParameterEnvironment, ResolvedRequest, RunOutcome};

/// Product identifier selecting the Plant 3D profile of the host.
pub const PRODUCT_ID: &str = "PLNT3D";

/// Switch introducing the product identifier.
const PRODUCT_FLAG: &str = "/product";
/// Switch introducing the batch script path.
const BATCH_SCRIPT_FLAG: &str = "/b";

/// Everything needed to start the host, fixed before anything is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    working_dir: PathBuf,
    env: ParameterEnvironment,
}

impl HostInvocation {
    /// Build the invocation for a resolved request and its script.
    ///
    /// The argument vector is `<host> /product PLNT3D /b <script>`.
    pub fn new(request: &ResolvedRequest, script_path: &Path) -> Self {
        Self {
            program: request.host_executable().to_path_buf(),
            args: vec![
                OsString::from(PRODUCT_FLAG),
                OsString::from(PRODUCT_ID),
                OsString::from(BATCH_SCRIPT_FLAG),
                script_path.as_os_str().to_os_string(),
            ],
            working_dir: request.working_directory().to_path_buf(),
            env: request.parameter_environment(),
        }
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments following the program.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .collect()
    }

    /// Working directory of the child.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Variables added to the child's inherited environment.
    pub fn env(&self) -> &ParameterEnvironment {
        &self.env
    }
}

/// Spawns the host and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    /// Upper bound on the wait; `None` waits for as long as the host runs.
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    /// Create a launcher with an optional time limit.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// The configured time limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the host to completion and return its exit code.
    ///
    /// A nonzero exit code is a normal outcome. Errors are reserved for a
    /// host that cannot be started, cannot be awaited, or outlives the
    /// time limit. On timeout the child is killed before returning.
    pub async fn launch(&self, invocation: &HostInvocation) -> Result<RunOutcome, ExportError> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.args())
            .current_dir(invocation.working_dir())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        for (key, value) in invocation.env().iter() {
            cmd.env(key, value);
        }

        debug!(
            argv = ?invocation.argv(),
            cwd = %invocation.working_dir().display(),
            timeout_s = self.timeout.map(|t| t.as_secs()),
            "Spawning host process"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| {
            error!(
                program = %invocation.program().display(),
                error = %source,
                "Failed to launch host process"
            );
            ExportError::Launch {
                program: invocation.program().to_path_buf(),
                source,
            }
        })?;

        let status = match self.timeout {
            None => child.wait().await,
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(result) => result,
                    Err(_) => {
                        error!(
                            timeout_s = limit.as_secs(),
                            "Host process timed out, killing"
                        );
                        if let Err(e) = child.kill().await {
                            warn!(error = %e, "Failed to kill timed-out host process");
                        }
                        return Err(ExportError::Timeout {
                            timeout_seconds: limit.as_secs(),
                        });
                    }
                }
            }
        }
        .map_err(|source| ExportError::Wait { source })?;

        let outcome = RunOutcome {
            exit_code: exit_code_of(status),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            exit_code = outcome.exit_code,
            elapsed_ms = outcome.elapsed_ms,
            "Host process exited"
        );
        Ok(outcome)
    }
}

/// Integer exit code of a finished process.
#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

/// Integer exit code of a finished process.
#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
