//! AutoCAD script generation for batch mode.

use crate::error::ExportError;
use crate::models::ResolvedRequest;

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Name of the script written into the working directory.
pub const SCRIPT_FILE_NAME: &str = "run.scr";

/// Command that loads a .NET assembly into the host.
const LOAD_PLUGIN_COMMAND: &str = "_.NETLOAD";
/// Command registered by the plugin that performs the export.
const EXPORT_COMMAND: &str = "_.EXPORTPLANTJSON";
/// Command that asks the host to exit.
const QUIT_COMMAND: &str = "_.QUIT";
/// Answer to the discard-changes prompt raised by `_.QUIT`.
const CONFIRM_QUIT: &str = "Y";

/// Generates AutoCAD `.scr` scripts.
pub struct ScriptingEngine;

impl ScriptingEngine {
    /// Render the script text for a plugin.
    ///
    /// The text depends on nothing but `plugin_binary`; two calls with the
    /// same path return identical bytes.
    pub fn render(plugin_binary: &Path) -> Result<String, ExportError> {
        let quoted = Self::quote(plugin_binary)?;
        let lines = [
            format!("{LOAD_PLUGIN_COMMAND} {quoted}"),
            EXPORT_COMMAND.to_string(),
            QUIT_COMMAND.to_string(),
            CONFIRM_QUIT.to_string(),
        ];
        Ok(lines.join("\n") + "\n")
    }

    /// Write the script for a resolved request to `<workdir>/run.scr`.
    ///
    /// Any script left by an earlier run is truncated and replaced.
    pub async fn write_script(request: &ResolvedRequest) -> Result<PathBuf, ExportError> {
        let content = Self::render(request.plugin_binary())?;
        let script_path = request.working_directory().join(SCRIPT_FILE_NAME);

        let write_err = |source| ExportError::WriteScript {
            path: script_path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&script_path)
            .await
            .map_err(write_err)?;
        file.write_all(content.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        tracing::debug!(script = %script_path.display(), "Automation script written");
        Ok(script_path)
    }

    /// Wrap a path in double quotes for a script argument.
    fn quote(path: &Path) -> Result<String, ExportError> {
        let text = path.to_str().ok_or_else(|| ExportError::UnscriptablePath {
            path: path.to_path_buf(),
            reason: "not valid UTF-8",
        })?;

        if text.contains('"') {
            return Err(ExportError::UnscriptablePath {
                path: path.to_path_buf(),
                reason: "contains a double quote",
            });
        }
        if text.contains(['\n', '\r']) {
            return Err(ExportError::UnscriptablePath {
                path: path.to_path_buf(),
                reason: "contains a line break",
            });
        }

        Ok(format!("\"{text}\""))
    }
}
