//! The file collection and its editing workflow.
//!
//! [`CollectionManager`] owns the imported files and the selection, and is the
//! only place where metadata changes. It calls the [`Extractor`] during import
//! and the [`Enricher`] on request; neither call runs while the state lock is
//! held, so a slow collaborator never blocks readers.

mod events;
mod state;

pub use events::CollectionEvent;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use vidiform_common::{
    CustomField, EnrichError, EntryId, ExportError, ExportFormat, FileEntry, FileHandle,
    ImportError, MetadataRecord, NoSelectionError, NotFoundError,
};

use crate::config::Config;
use crate::export::{self, ExportArtifact};
use crate::metadata::Enricher;
use crate::probe::Extractor;

use state::CollectionState;

const EVENT_CAPACITY: usize = 256;

/// Tuning knobs for a [`CollectionManager`].
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Extractions allowed in flight at once during an import.
    pub import_concurrency: usize,
    /// Upper bound for a single enrichment lookup.
    pub enrich_timeout: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            import_concurrency: 1,
            enrich_timeout: Duration::from_secs(10),
        }
    }
}

impl ManagerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            import_concurrency: config.import.concurrency.max(1),
            enrich_timeout: config.tmdb.timeout(),
        }
    }
}

/// Read-only view of the selection, as shown in the metadata editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorState {
    /// Name of the selected file, if any.
    pub file_name: Option<String>,
    /// The selected file's metadata, or an empty record.
    pub metadata: MetadataRecord,
    /// `false` when nothing is selected and the form must be disabled.
    pub editable: bool,
}

/// Which entry a metadata replacement applies to.
enum Target {
    Selected,
    Entry(EntryId),
}

/// Owns the imported files and the current selection.
///
/// Shared as `Arc<CollectionManager>`; every method takes `&self`.
pub struct CollectionManager {
    state: RwLock<CollectionState>,
    extractor: Arc<dyn Extractor>,
    enricher: Arc<dyn Enricher>,
    options: ManagerOptions,
    event_tx: broadcast::Sender<CollectionEvent>,
}

impl CollectionManager {
    pub fn new(extractor: Arc<dyn Extractor>, enricher: Arc<dyn Enricher>) -> Self {
        Self::with_options(extractor, enricher, ManagerOptions::default())
    }

    pub fn with_options(
        extractor: Arc<dyn Extractor>,
        enricher: Arc<dyn Enricher>,
        options: ManagerOptions,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(CollectionState::default()),
            extractor,
            enricher,
            options,
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: CollectionEvent) {
        let kind = event.kind();
        if self.event_tx.send(event).is_err() {
            tracing::trace!(event = kind, "No subscribers for collection event");
        }
    }

    // ------------------------------------------------------------------
    // Import / removal / selection
    // ------------------------------------------------------------------

    /// Extract and append `handles` in input order.
    ///
    /// Up to `import_concurrency` extractions run at once, but entries are
    /// appended strictly in input order. The first failure (in input order)
    /// stops the batch; files appended before it are kept. If nothing was
    /// selected, the first newly imported file becomes selected.
    pub async fn import_files(&self, handles: Vec<FileHandle>) -> Result<usize, ImportError> {
        let total = handles.len();
        info!(files = total, extractor = self.extractor.name(), "Importing files");

        let extractor = &self.extractor;
        let mut results = stream::iter(handles.into_iter().map(|handle| async move {
            let result = extractor.extract(&handle).await;
            (handle, result)
        }))
        .buffered(self.options.import_concurrency.max(1));

        let mut new_ids = Vec::with_capacity(total);
        let mut failure = None;

        while let Some((handle, result)) = results.next().await {
            match result {
                Ok(metadata) => {
                    let entry = FileEntry::from_handle(&handle, metadata);
                    debug!(file = %entry.name, size = entry.size, "Imported file");
                    new_ids.push(entry.id);
                    self.state.write().push(entry);
                    self.broadcast(CollectionEvent::ImportProgress {
                        completed: new_ids.len(),
                        total,
                    });
                }
                Err(source) => {
                    failure = Some(ImportError {
                        imported: new_ids.len(),
                        file_name: handle.name,
                        source,
                    });
                    break;
                }
            }
        }
        drop(results);

        let selected_name = {
            let mut state = self.state.write();
            state
                .select_first_if_unset(&new_ids)
                .and_then(|id| state.get(id))
                .map(|e| e.name.clone())
        };
        if let Some(name) = selected_name {
            self.broadcast(CollectionEvent::SelectionChanged { name: Some(name) });
        }

        match failure {
            Some(err) => {
                warn!(
                    file = %err.file_name,
                    imported = err.imported,
                    error = %err.source,
                    "Import stopped on extraction failure"
                );
                self.broadcast(CollectionEvent::ImportFailed {
                    file_name: err.file_name.clone(),
                    imported: err.imported,
                    error: err.source.to_string(),
                });
                Err(err)
            }
            None => {
                info!(imported = new_ids.len(), "Import complete");
                self.broadcast(CollectionEvent::FilesImported {
                    count: new_ids.len(),
                });
                Ok(new_ids.len())
            }
        }
    }

    /// Remove the first file named `name`. Unknown names are ignored.
    ///
    /// Returns `true` if a file was removed.
    pub fn remove_file(&self, name: &str) -> bool {
        let (removal, selected_name) = {
            let mut state = self.state.write();
            let Some(removal) = state.remove_first_named(name) else {
                debug!(file = name, "Remove ignored, no such file");
                return false;
            };
            let selected_name = removal
                .reselected
                .map(|id| id.and_then(|id| state.get(id).map(|e| e.name.clone())));
            (removal, selected_name)
        };

        info!(file = %removal.entry.name, "Removed file");
        self.broadcast(CollectionEvent::FileRemoved {
            name: removal.entry.name,
        });
        if let Some(name) = selected_name {
            self.broadcast(CollectionEvent::SelectionChanged { name });
        }
        true
    }

    /// Select the first file named `name`.
    pub fn select_file(&self, name: &str) -> Result<(), NotFoundError> {
        let changed = {
            let mut state = self.state.write();
            let id = state
                .find_by_name(name)
                .map(|e| e.id)
                .ok_or_else(|| NotFoundError::new(name))?;
            state.select(id)
        };

        if changed {
            debug!(file = name, "Selected file");
            self.broadcast(CollectionEvent::SelectionChanged {
                name: Some(name.to_string()),
            });
        }
        Ok(())
    }

    /// Select the entry with `id`. Returns `false` if it is not present.
    ///
    /// Unlike [`select_file`](Self::select_file) this can address any of
    /// several files sharing a name.
    pub fn select_entry(&self, id: EntryId) -> bool {
        let (name, changed) = {
            let mut state = self.state.write();
            let Some(name) = state.get(id).map(|e| e.name.clone()) else {
                return false;
            };
            let changed = state.select(id);
            (name, changed)
        };

        if changed {
            debug!(file = %name, "Selected file");
            self.broadcast(CollectionEvent::SelectionChanged { name: Some(name) });
        }
        true
    }

    // ------------------------------------------------------------------
    // Metadata editing
    // ------------------------------------------------------------------

    /// Save the editor form for the selected file.
    ///
    /// `custom_fields` are written into `record` in order before it replaces
    /// the stored record; a custom field named like a fixed attribute
    /// overwrites that attribute.
    pub fn save_metadata(
        &self,
        record: MetadataRecord,
        custom_fields: &[CustomField],
    ) -> Result<(), NoSelectionError> {
        let mut record = record;
        record.apply_custom_fields(custom_fields);
        self.replace_metadata(Target::Selected, |_| record)
            .map(|_| ())
            .ok_or(NoSelectionError)
    }

    /// Clear the selected file's editable metadata, keeping technical fields.
    pub fn reset_metadata(&self) -> Result<MetadataRecord, NoSelectionError> {
        self.replace_metadata(Target::Selected, |current| {
            let mut record = current.clone();
            record.clear_editable();
            record
        })
        .ok_or(NoSelectionError)
    }

    /// Look up the selected file's title and merge the result into its
    /// metadata.
    ///
    /// Only `title`, `year`, `genre` and `description` can change. The merge
    /// targets the file that was selected when the lookup started; if that
    /// file is removed before the lookup returns, the result is discarded.
    pub async fn enrich_selected(&self) -> Result<MetadataRecord, EnrichError> {
        let (id, name, title) = {
            let state = self.state.read();
            let entry = state.selected_entry().ok_or(EnrichError::NoSelection)?;
            (entry.id, entry.name.clone(), entry.metadata.title.clone())
        };

        info!(file = %name, title = %title, enricher = self.enricher.name(), "Enriching metadata");

        let timeout = self.options.enrich_timeout;
        let partial = match tokio::time::timeout(timeout, self.enricher.lookup(&title)).await {
            Err(_) => {
                warn!(file = %name, after = ?timeout, "Metadata lookup timed out");
                return Err(EnrichError::Timeout { after: timeout });
            }
            Ok(Err(e)) => {
                warn!(file = %name, error = %e, "Metadata lookup failed");
                return Err(EnrichError::Transport(e));
            }
            Ok(Ok(None)) => {
                info!(file = %name, title = %title, "No metadata found");
                return Err(EnrichError::NotFound { title });
            }
            Ok(Ok(Some(partial))) => partial,
        };

        self.replace_metadata(Target::Entry(id), |current| {
            let mut record = current.clone();
            record.merge_enrichment(&partial);
            record
        })
        .ok_or_else(|| {
            warn!(file = %name, "File removed during lookup; discarding result");
            EnrichError::NoSelection
        })
    }

    /// Enrich every entry in collection order, one lookup at a time.
    ///
    /// Each entry is selected in turn; failures are collected rather than
    /// stopping the run. The previous selection is restored afterwards if it
    /// is still present.
    pub async fn enrich_all(&self) -> Vec<(String, Result<MetadataRecord, EnrichError>)> {
        let previous = self.state.read().selected_id();
        let mut outcomes = Vec::new();

        for entry in self.entries() {
            if !self.select_entry(entry.id) {
                continue;
            }
            outcomes.push((entry.name, self.enrich_selected().await));
        }

        if let Some(id) = previous {
            self.select_entry(id);
        }
        outcomes
    }

    /// Replace one entry's record with `build(current)` under a single write
    /// lock. Returns the stored record, or `None` if the target is missing.
    fn replace_metadata<F>(&self, target: Target, build: F) -> Option<MetadataRecord>
    where
        F: FnOnce(&MetadataRecord) -> MetadataRecord,
    {
        let (name, record) = {
            let mut state = self.state.write();
            let id = match target {
                Target::Selected => state.selected_id()?,
                Target::Entry(id) => id,
            };
            let entry = state.get_mut(id)?;
            entry.metadata = build(&entry.metadata);
            (entry.name.clone(), entry.metadata.clone())
        };

        debug!(file = %name, "Saved metadata");
        self.broadcast(CollectionEvent::MetadataSaved { name });
        Some(record)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Snapshot of all entries in collection order.
    pub fn entries(&self) -> Vec<FileEntry> {
        self.state.read().entries().to_vec()
    }

    /// Snapshot of the selected entry.
    pub fn selected(&self) -> Option<FileEntry> {
        self.state.read().selected_entry().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries().is_empty()
    }

    /// Current contents of the metadata editor.
    pub fn editor_state(&self) -> EditorState {
        match self.state.read().selected_entry() {
            Some(entry) => EditorState {
                file_name: Some(entry.name.clone()),
                metadata: entry.metadata.clone(),
                editable: true,
            },
            None => EditorState {
                file_name: None,
                metadata: MetadataRecord::default(),
                editable: false,
            },
        }
    }

    fn records(&self) -> Vec<MetadataRecord> {
        self.state
            .read()
            .entries()
            .iter()
            .map(|e| e.metadata.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Serialize every record, in collection order.
    pub fn export_all(&self, format: ExportFormat) -> Result<String, ExportError> {
        export::serialize(&self.records(), format)
    }

    /// Export every record as `metadata.<ext>`.
    pub fn export_artifact(&self, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
        ExportArtifact::aggregate(&self.records(), format)
    }

    /// Export the selected record as `<file name>-metadata.json`.
    pub fn export_selected(&self) -> Result<ExportArtifact, ExportError> {
        let selected = self.selected().ok_or(NoSelectionError)?;
        ExportArtifact::single(&selected.name, &selected.metadata)
    }
}
