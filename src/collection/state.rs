use vidiform_common::{EntryId, FileEntry};

/// Entries plus the selection pointer.
///
/// Every method keeps the selection pointing at an entry that is present, or
/// at nothing.
#[derive(Debug, Default)]
pub(crate) struct CollectionState {
    entries: Vec<FileEntry>,
    selected: Option<EntryId>,
}

/// Outcome of removing an entry.
pub(crate) struct Removal {
    pub entry: FileEntry,
    /// Set when the removed entry was selected; holds the new selection.
    pub reselected: Option<Option<EntryId>>,
}

impl CollectionState {
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn selected_id(&self) -> Option<EntryId> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn push(&mut self, entry: FileEntry) {
        self.entries.push(entry);
    }

    /// Select `id` if it is present. Returns `true` if the selection changed.
    pub fn select(&mut self, id: EntryId) -> bool {
        if self.get(id).is_none() || self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// When nothing is selected, select the first of `candidates` that is
    /// still present and return it.
    pub fn select_first_if_unset(&mut self, candidates: &[EntryId]) -> Option<EntryId> {
        if self.selected.is_some() {
            return None;
        }
        let id = candidates.iter().copied().find(|id| self.get(*id).is_some())?;
        self.selected = Some(id);
        Some(id)
    }

    /// Remove the first entry named `name`, moving the selection to the first
    /// remaining entry if the removed one was selected.
    pub fn remove_first_named(&mut self, name: &str) -> Option<Removal> {
        let idx = self.entries.iter().position(|e| e.name == name)?;
        let entry = self.entries.remove(idx);

        let reselected = if self.selected == Some(entry.id) {
            self.selected = self.entries.first().map(|e| e.id);
            Some(self.selected)
        } else {
            None
        };

        Some(Removal { entry, reselected })
    }
}
