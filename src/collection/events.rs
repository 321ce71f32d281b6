use serde::{Deserialize, Serialize};

/// Change notification emitted by the collection.
///
/// Front ends subscribe to these to refresh the file list, the editor form,
/// and progress or toast displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CollectionEvent {
    /// One more file of the running batch has been imported.
    ImportProgress { completed: usize, total: usize },
    /// A batch finished without errors.
    FilesImported { count: usize },
    /// A batch stopped at a file whose extraction failed.
    ImportFailed {
        file_name: String,
        imported: usize,
        error: String,
    },
    FileRemoved { name: String },
    /// The selection moved; `None` means nothing is selected.
    SelectionChanged { name: Option<String> },
    /// The metadata of a file was replaced.
    MetadataSaved { name: String },
}

impl CollectionEvent {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ImportProgress { .. } => "import_progress",
            Self::FilesImported { .. } => "files_imported",
            Self::ImportFailed { .. } => "import_failed",
            Self::FileRemoved { .. } => "file_removed",
            Self::SelectionChanged { .. } => "selection_changed",
            Self::MetadataSaved { .. } => "metadata_saved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_is_tagged() {
        let event = CollectionEvent::SelectionChanged {
            name: Some("a.mp4".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "selection_changed");
        assert_eq!(json["name"], "a.mp4");
        assert_eq!(event.kind(), "selection_changed");
    }
}
