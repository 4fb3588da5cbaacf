//! Input resolution: normalizes request paths, checks the required inputs
//! and creates the working and output directories.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ExportError, RequiredInput};
use crate::models::{ResolvedRequest, RunRequest};

/// Turns a [`RunRequest`] into a [`ResolvedRequest`].
pub struct InputResolver;

impl InputResolver {
    /// Validate a request and prepare its directories.
    ///
    /// Existence of the host executable, project file and plugin binary is
    /// checked in that order before anything touches the filesystem, so a
    /// missing input never leaves directories behind. Directory creation is
    /// recursive and succeeds when the directories already exist.
    pub async fn resolve(request: RunRequest) -> Result<ResolvedRequest, ExportError> {
        let host_executable =
            Self::require(RequiredInput::HostExecutable, &request.host_executable).await?;
        let project_file =
            Self::require(RequiredInput::ProjectFile, &request.project_file).await?;
        let plugin_binary =
            Self::require(RequiredInput::PluginBinary, &request.plugin_binary).await?;

        let working_directory = Self::absolutize(&request.working_directory)?;
        let output_artifact = Self::absolutize(&request.output_artifact)?;
        let output_parent = output_artifact
            .parent()
            .ok_or_else(|| ExportError::NoParentDir {
                path: output_artifact.clone(),
            })?
            .to_path_buf();

        Self::ensure_dir(&working_directory).await?;
        Self::ensure_dir(&output_parent).await?;

        Ok(ResolvedRequest {
            host_executable,
            project_file,
            plugin_binary,
            output_artifact,
            working_directory,
        })
    }

    /// Normalize a required input and confirm it exists.
    async fn require(input: RequiredInput, path: &Path) -> Result<PathBuf, ExportError> {
        let missing = || ExportError::MissingInput {
            input,
            path: path.to_path_buf(),
        };

        let absolute = std::path::absolute(path).map_err(|_| missing())?;
        // An unreadable parent counts as missing.
        match tokio::fs::try_exists(&absolute).await {
            Ok(true) => Ok(absolute),
            _ => Err(missing()),
        }
    }

    fn absolutize(path: &Path) -> Result<PathBuf, ExportError> {
        std::path::absolute(path).map_err(|source| ExportError::InvalidPath {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
        debug!(dir = %dir.display(), "Ensuring directory exists");
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ExportError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })
    }
}
