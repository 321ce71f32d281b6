//! Metadata export.
//!
//! Serialization is a pure function of the record list and the format: the
//! same input always produces byte-identical output. CSV and XML carry a fixed
//! column set; JSON carries every field, custom fields included.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::info;
use vidiform_common::{ExportError, ExportFormat, MetadataRecord};

/// Columns written by the tabular formats, in order.
///
/// `description`, `codec` and custom fields are only available in JSON.
pub const TABULAR_FIELDS: [&str; 6] = [
    "title",
    "year",
    "genre",
    "duration",
    "resolution",
    "frameRate",
];

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serialize `records` in the given format.
pub fn serialize(records: &[MetadataRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => Ok(to_csv(records)),
        ExportFormat::Xml => Ok(to_xml(records)),
    }
}

fn to_csv(records: &[MetadataRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(TABULAR_FIELDS.join(","));
    for record in records {
        let row: Vec<String> = TABULAR_FIELDS
            .iter()
            .map(|field| csv_field(&record.text_value(field)).into_owned())
            .collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Quote a CSV field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn to_xml(records: &[MetadataRecord]) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push_str("\n<videos>\n");
    for record in records {
        out.push_str("  <video>\n");
        for field in TABULAR_FIELDS {
            let value = record.text_value(field);
            out.push_str(&format!("    <{field}>{}</{field}>\n", xml_escape(&value)));
        }
        out.push_str("  </video>\n");
    }
    out.push_str("</videos>\n");
    out
}

fn xml_escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Serialized export together with its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub content: String,
}

impl ExportArtifact {
    /// Export of a whole collection, named `metadata.<ext>`.
    pub fn aggregate(records: &[MetadataRecord], format: ExportFormat) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: format!("metadata.{}", format.extension()),
            format,
            content: serialize(records, format)?,
        })
    }

    /// JSON export of one record, named `<file name>-metadata.json`.
    pub fn single(file_name: &str, record: &MetadataRecord) -> Result<Self, ExportError> {
        let safe_name = file_name.replace(['/', '\\'], "_");
        Ok(Self {
            file_name: format!("{safe_name}-metadata.json"),
            format: ExportFormat::Json,
            content: serde_json::to_string_pretty(record)?,
        })
    }

    /// Write the artifact into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        info!(path = %path.display(), bytes = self.content.len(), "Wrote export");
        Ok(path)
    }
}
