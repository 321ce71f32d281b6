//! Error types shared by the collection core and its collaborators.
//!
//! Every error here is recoverable: callers surface them to the user and keep
//! going. Extraction and lookup failures come from the external collaborators;
//! the remaining types describe misuse of the collection itself.

use std::time::Duration;

/// Failure while extracting technical metadata from a file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// The tool ran but its output could not be used.
    #[error("failed to parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    /// The file itself was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Failure of a metadata lookup against an external service.
///
/// A lookup that completes without a match is not an error; it is reported
/// as `Ok(None)` by the enricher.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The service is not configured (for example, no API key).
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),

    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with an error status.
    #[error("service returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// A batch import stopped at a file whose extraction failed.
///
/// Files imported before the failure stay in the collection.
#[derive(Debug, thiserror::Error)]
#[error("import stopped at '{file_name}' after {imported} file(s): {source}")]
pub struct ImportError {
    /// Number of files appended before the failure.
    pub imported: usize,
    /// Name of the file that failed.
    pub file_name: String,
    #[source]
    pub source: ExtractError,
}

/// No file with the requested name exists in the collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no file named '{name}'")]
pub struct NotFoundError {
    pub name: String,
}

impl NotFoundError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An operation needed a selected file but none is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no file is selected")]
pub struct NoSelectionError;

/// Failure of an enrichment request for the selected file.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("no file is selected")]
    NoSelection,

    /// The lookup completed but found no match.
    #[error("no metadata found for '{title}'")]
    NotFound { title: String },

    #[error("metadata lookup timed out after {after:?}")]
    Timeout { after: Duration },

    /// The lookup itself failed.
    #[error("metadata lookup failed: {0}")]
    Transport(#[from] LookupError),
}

impl From<NoSelectionError> for EnrichError {
    fn from(_: NoSelectionError) -> Self {
        Self::NoSelection
    }
}

/// Failure while producing an export artifact.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The requested format is not one of json, csv or xml.
    #[error("unsupported export format: '{0}'")]
    UnsupportedFormat(String),

    #[error("no file is selected")]
    NoSelection,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NoSelectionError> for ExportError {
    fn from(_: NoSelectionError) -> Self {
        Self::NoSelection
    }
}
