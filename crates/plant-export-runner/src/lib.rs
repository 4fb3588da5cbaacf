//! # Plant Export Runner
//!
//! Drives AutoCAD Plant 3D in batch mode to export a project as JSON.
//!
//! A run has three stages, always in this order:
//!
//! 1. [`InputResolver`] checks that the host executable, project file and
//!    plugin binary exist, then creates the working and output directories.
//! 2. [`ScriptingEngine`] writes `run.scr` into the working directory. The
//!    script loads the plugin, runs `EXPORTPLANTJSON` and quits.
//! 3. [`ProcessLauncher`] starts the host with `/product PLNT3D /b run.scr`,
//!    passing the project and output paths through `PLANT_PROJECT_XML` and
//!    `PLANT_JSON_OUT`, and returns the host's exit code.
//!
//! The export artifact itself is never read.

pub mod config;
pub mod error;
pub mod input_resolver;
pub mod launcher;
pub mod models;
pub mod processor;
pub mod scripting;

pub use config::ExportConfig;
pub use error::{ExportError, FailureKind, RequiredInput};
pub use input_resolver::InputResolver;
pub use launcher::{HostInvocation, ProcessLauncher};
pub use models::{ResolvedRequest, RunOutcome, RunRequest};
pub use processor::{ExportProcessor, PreparedRun};
pub use scripting::ScriptingEngine;
