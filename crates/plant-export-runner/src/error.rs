//! Unified error type for the export orchestration.
//!
//! Every failure that stops a run before or while launching the host is an
//! [`ExportError`]. A host that launches and exits with a nonzero code is
//! not an error; its code is reported through [`crate::RunOutcome`].

use plant_export_core::error::AppError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One of the three inputs that must exist before a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredInput {
    /// The CAD host executable.
    HostExecutable,
    /// The project definition file.
    ProjectFile,
    /// The plugin binary loaded into the host.
    PluginBinary,
}

impl fmt::Display for RequiredInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostExecutable => write!(f, "host executable"),
            Self::ProjectFile => write!(f, "project file"),
            Self::PluginBinary => write!(f, "plugin binary"),
        }
    }
}

/// Failure taxonomy used to pick an exit code at the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required input path does not exist.
    MissingInput,
    /// Directory creation or script write failed.
    Filesystem,
    /// A path cannot be embedded in the automation script.
    Validation,
    /// The host could not be started or awaited.
    Launch,
    /// The host outlived the configured time limit.
    Timeout,
}

/// Unified error type for all export orchestration operations.
#[derive(Debug, Error)]
pub enum ExportError {
    // --- Resolution errors ---
    /// A required input does not exist.
    #[error("{input} not found: {path}")]
    MissingInput {
        /// Which input is missing.
        input: RequiredInput,
        /// The path that was checked.
        path: PathBuf,
    },

    /// A directory could not be created.
    #[error("Cannot create directory {path}: {source}")]
    CreateDirectory {
        /// The directory that was being created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A path could not be made absolute.
    #[error("Cannot resolve path {path:?}: {source}")]
    InvalidPath {
        /// The path as supplied.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Output parent directory could not be determined.
    #[error("Cannot determine parent directory for: {path}")]
    NoParentDir {
        /// The path whose parent could not be determined.
        path: PathBuf,
    },

    // --- Script errors ---
    /// The plugin path cannot be quoted into a script line.
    #[error("Path cannot be used in an automation script ({reason}): {path}")]
    UnscriptablePath {
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// The automation script could not be written.
    #[error("Cannot write automation script {path}: {source}")]
    WriteScript {
        /// Script path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    // --- Process errors ---
    /// The host executable could not be started.
    #[error("Failed to launch {program}: {source}")]
    Launch {
        /// The program that was spawned.
        program: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Waiting on the host process failed.
    #[error("Failed to wait for host process: {source}")]
    Wait {
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The host process timed out and was killed.
    #[error("Host process timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },
}

impl ExportError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingInput { .. } => FailureKind::MissingInput,
            Self::CreateDirectory { .. } | Self::NoParentDir { .. } | Self::WriteScript { .. } => {
                FailureKind::Filesystem
            }
            Self::UnscriptablePath { .. } | Self::InvalidPath { .. } => FailureKind::Validation,
            Self::Launch { .. } | Self::Wait { .. } => FailureKind::Launch,
            Self::Timeout { .. } => FailureKind::Timeout,
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        let message = err.to_string();
        match err.kind() {
            FailureKind::MissingInput => AppError::not_found(message),
            FailureKind::Validation => AppError::validation(message),
            FailureKind::Timeout => AppError::timeout(message),
            FailureKind::Filesystem => match err {
                ExportError::CreateDirectory { source, .. }
                | ExportError::WriteScript { source, .. } => AppError::with_source(
                    plant_export_core::ErrorKind::Storage,
                    message,
                    source,
                ),
                _ => AppError::storage(message),
            },
            FailureKind::Launch => match err {
                ExportError::Launch { source, .. } | ExportError::Wait { source } => {
                    AppError::with_source(
                        plant_export_core::ErrorKind::ExternalService,
                        message,
                        source,
                    )
                }
                _ => AppError::external_service(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_export_core::ErrorKind;

    #[test]
    fn test_missing_input_names_the_input() {
        let err = ExportError::MissingInput {
            input: RequiredInput::ProjectFile,
            path: PathBuf::from("/plant/Project.xml"),
        };
        assert_eq!(err.to_string(), "project file not found: /plant/Project.xml");
        assert_eq!(err.kind(), FailureKind::MissingInput);
    }

    #[test]
    fn test_app_error_mapping() {
        let launch = ExportError::Launch {
            program: PathBuf::from("acad.exe"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(AppError::from(launch).kind, ErrorKind::ExternalService);

        let write = ExportError::WriteScript {
            path: PathBuf::from("/work/run.scr"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let app = AppError::from(write);
        assert_eq!(app.kind, ErrorKind::Storage);
        assert!(app.source.is_some());

        let timeout = ExportError::Timeout { timeout_seconds: 5 };
        assert_eq!(AppError::from(timeout).kind, ErrorKind::Timeout);
    }
}
