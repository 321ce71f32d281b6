//! Metadata records and their field-routing rules.
//!
//! A [`MetadataRecord`] keeps the well-known attributes of a video as typed
//! fields and everything else in a separate map of custom fields. The two
//! never overlap: [`MetadataRecord::set_field`] routes a fixed attribute name
//! to its typed field, so the record always flattens to a single mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Names of the fixed attributes, as they appear in serialized output.
pub const FIXED_FIELDS: &[&str] = &[
    "title",
    "year",
    "genre",
    "description",
    "duration",
    "resolution",
    "frameRate",
    "codec",
];

/// Descriptive and technical metadata for one video file.
///
/// `duration`, `resolution`, `frame_rate` and `codec` are produced by the
/// extractor and are read-only from the editor's point of view; enrichment
/// never touches them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub frame_rate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// User-defined fields. Keys never match an entry of [`FIXED_FIELDS`].
    #[serde(flatten)]
    custom: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Create a record with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder-style variant of [`set_field`](Self::set_field).
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Write a single named value into the record.
    ///
    /// Fixed attribute names overwrite the typed field; any other name is
    /// stored as a custom field. Empty names are ignored. For `year`, an
    /// empty value clears the year and a non-numeric value is ignored.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let value = value.into();

        match name {
            "title" => self.title = value,
            "duration" => self.duration = value,
            "resolution" => self.resolution = value,
            "frameRate" => self.frame_rate = value,
            "genre" => self.genre = non_empty(value),
            "description" => self.description = non_empty(value),
            "codec" => self.codec = non_empty(value),
            "year" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    self.year = None;
                } else {
                    match trimmed.parse::<i32>() {
                        Ok(year) => self.year = Some(year),
                        Err(_) => {
                            tracing::warn!(value = %value, "Ignoring non-numeric year");
                        }
                    }
                }
            }
            other => {
                self.custom.insert(other.to_string(), value);
            }
        }
    }

    /// Apply custom fields in order; later fields win.
    pub fn apply_custom_fields(&mut self, fields: &[CustomField]) {
        for field in fields {
            self.set_field(&field.name, field.value.clone());
        }
    }

    /// Overlay enrichment data onto the descriptive attributes.
    ///
    /// Only `title`, `year`, `genre` and `description` are written, and only
    /// when the enrichment carries a value for them.
    pub fn merge_enrichment(&mut self, partial: &PartialMetadata) {
        if let Some(title) = &partial.title {
            self.title = title.clone();
        }
        if let Some(year) = partial.year {
            self.year = Some(year);
        }
        if let Some(genre) = &partial.genre {
            self.genre = Some(genre.clone());
        }
        if let Some(description) = &partial.description {
            self.description = Some(description.clone());
        }
    }

    /// Clear every user-editable value, keeping the technical fields.
    pub fn clear_editable(&mut self) {
        self.title.clear();
        self.year = None;
        self.genre = None;
        self.description = None;
        self.custom.clear();
    }

    /// Look up a custom field by name.
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str)
    }

    /// Iterate over custom fields in key order.
    pub fn custom_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Remove a custom field, returning its previous value.
    pub fn remove_custom_field(&mut self, name: &str) -> Option<String> {
        self.custom.remove(name)
    }

    /// Render a named value as text, with absent values as the empty string.
    ///
    /// Used by the tabular export formats.
    pub fn text_value(&self, name: &str) -> String {
        match name {
            "title" => self.title.clone(),
            "year" => self.year.map(|y| y.to_string()).unwrap_or_default(),
            "genre" => self.genre.clone().unwrap_or_default(),
            "description" => self.description.clone().unwrap_or_default(),
            "duration" => self.duration.clone(),
            "resolution" => self.resolution.clone(),
            "frameRate" => self.frame_rate.clone(),
            "codec" => self.codec.clone().unwrap_or_default(),
            other => self.custom.get(other).cloned().unwrap_or_default(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// A user-defined name/value pair submitted with the metadata form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Descriptive metadata returned by an enrichment lookup.
///
/// Every field is optional; absent fields leave the target record untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMetadata {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

impl PartialMetadata {
    /// Returns `true` if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.description.is_none()
    }
}
