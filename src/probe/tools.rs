//! External tool detection.

use std::path::{Path, PathBuf};
use std::process::Command;

use vidiform_common::ExtractError;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool as configured.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the tool's version output, if available.
    pub version: Option<String>,
    /// Resolved path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// `tool` may be a bare name looked up on `PATH` or a path to an executable.
/// ffmpeg-family tools print their version with `-version`.
///
/// # Example
///
/// ```no_run
/// use vidiform::probe::check_tool;
///
/// let info = check_tool("ffprobe".as_ref(), "-version");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(tool: &Path, version_arg: &str) -> ToolInfo {
    let name = tool.display().to_string();
    let path = match require_tool(tool) {
        Ok(path) => path,
        Err(_) => {
            return ToolInfo {
                name,
                available: false,
                version: None,
                path: None,
            }
        }
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: Some(path),
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: Some(path),
        },
    }
}

/// Check the tools used for metadata extraction.
pub fn check_tools(ffprobe: &Path) -> Vec<ToolInfo> {
    vec![check_tool(ffprobe, "-version")]
}

/// Require that a tool is available, returning its resolved path.
///
/// # Errors
///
/// Returns [`ExtractError::ToolNotFound`] if the tool cannot be located.
pub fn require_tool(tool: &Path) -> Result<PathBuf, ExtractError> {
    which::which(tool).map_err(|_| ExtractError::tool_not_found(tool.display().to_string()))
}
