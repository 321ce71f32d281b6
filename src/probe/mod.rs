//! Technical metadata extraction.
//!
//! The collection calls an [`Extractor`] once per imported file. The default
//! implementation shells out to ffprobe; tests and embedders can supply their
//! own.

mod ffprobe;
mod tools;

pub use ffprobe::FfprobeExtractor;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};

use std::path::Path;

use async_trait::async_trait;
use vidiform_common::{ExtractError, FileHandle, MetadataRecord};

/// Turns a raw file into its initial metadata record.
///
/// An extraction either yields a record with at least `title`, `duration`,
/// `resolution` and `frame_rate` populated, or fails; it never reports a
/// partial result.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short, lowercase identifier used in logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, handle: &FileHandle) -> Result<MetadataRecord, ExtractError>;
}

/// Read a file from disk into a [`FileHandle`].
pub async fn read_handle(path: &Path) -> Result<FileHandle, ExtractError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractError::InvalidInput(format!("not a file path: {:?}", path)))?
        .to_string();

    let content = tokio::fs::read(path).await?;
    Ok(FileHandle::new(name, content))
}
