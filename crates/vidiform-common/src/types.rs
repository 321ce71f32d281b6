//! Core type definitions for imported files and export formats.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::ids::EntryId;
use crate::paths::media_type_for_name;
use crate::record::MetadataRecord;

/// An imported file together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: EntryId,
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub media_type: String,
    pub metadata: MetadataRecord,
}

impl FileEntry {
    /// Build an entry from the handle it was imported from.
    pub fn from_handle(handle: &FileHandle, metadata: MetadataRecord) -> Self {
        Self {
            id: EntryId::new(),
            name: handle.name.clone(),
            size: handle.size,
            media_type: handle.media_type.clone(),
            metadata,
        }
    }
}

/// Raw file as delivered by a file picker or drag-and-drop surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub content: Bytes,
}

impl FileHandle {
    /// Create a handle, deriving size from the content and media type from
    /// the file name's extension.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content = content.into();
        Self {
            media_type: media_type_for_name(&name).to_string(),
            size: content.len() as u64,
            name,
            content,
        }
    }

    /// Override the media type reported by the picker.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(0) | None => &self.name,
            Some(idx) => &self.name[..idx],
        }
    }

    /// Final extension of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&self.name[idx + 1..]),
        }
    }
}

/// Serialized output format for metadata export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    /// All supported formats.
    pub const ALL: [ExportFormat; 3] = [Self::Json, Self::Csv, Self::Xml];

    /// File extension used for artifacts in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}
