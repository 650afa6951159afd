// Attached files, in display order

use std::fmt;

use filedock_core::FileHandle;
use filedock_store_client::RecordId;

/// Registry-assigned identity of one inserted handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a file stands relative to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Save not finished (or not started)
    #[default]
    Pending,
    /// Backed by a stored record
    Saved(RecordId),
    /// Save failed; the entry has no backing record
    Failed,
}

impl SyncState {
    /// Short label for list display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Saving...",
            Self::Saved(_) => "Saved",
            Self::Failed => "Not saved",
        }
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::Saved(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: FileId,
    pub handle: FileHandle,
    pub sync: SyncState,
}

/// Ordered collection of attached files. Insertion order is display order.
#[derive(Debug, Default)]
pub struct FileRegistry {
    entries: Vec<FileEntry>,
    next_id: u64,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly attached file (save pending).
    pub fn add(&mut self, handle: FileHandle) -> FileId {
        self.push(handle, SyncState::Pending)
    }

    /// Append a file reconstructed from a stored record.
    pub fn add_saved(&mut self, handle: FileHandle, record: RecordId) -> FileId {
        self.push(handle, SyncState::Saved(record))
    }

    fn push(&mut self, handle: FileHandle, sync: SyncState) -> FileId {
        self.next_id += 1;
        let id = FileId(self.next_id);
        self.entries.push(FileEntry { id, handle, sync });
        id
    }

    /// Remove an entry. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: FileId) -> Option<FileEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: FileId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Update an entry's sync state. Returns false if the entry is gone.
    pub fn set_sync(&mut self, id: FileId, sync: SyncState) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.sync = sync;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File names joined by ", " in display order.
    pub fn output(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.handle.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
