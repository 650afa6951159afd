// Record store bridge
//
// Turns attached files into create requests and stored records back into
// lightweight entries. Failures never escape as faults: callers get a
// BridgeError to log, or an empty list.

use filedock_core::{codec, FileHandle};
use filedock_store_client::{normalize_owner_id, CreateFileRequest, FileRecord, RecordId, StoreClient, StoreError};
use thiserror::Error;

/// Backing store for file records.
pub trait RecordStore {
    fn create(&self, request: &CreateFileRequest) -> Result<RecordId, StoreError>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, StoreError>;
    fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

impl RecordStore for StoreClient {
    fn create(&self, request: &CreateFileRequest) -> Result<RecordId, StoreError> {
        self.create_file(request)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, StoreError> {
        self.list_files_for_owner(owner_id)
    }

    fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.delete_file(id)
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// No owner to bind the record to; the store was not contacted
    #[error("no owner id provided")]
    MissingOwner,
    #[error("failed to save '{name}': {source}")]
    SaveFailed {
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to list files for owner {owner}: {source}")]
    ListFailed {
        owner: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete record {id}: {source}")]
    DeleteFailed {
        id: RecordId,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone)]
pub struct PersistenceBridge<R: RecordStore> {
    store: R,
    owner_entity_set: String,
}

impl<R: RecordStore> PersistenceBridge<R> {
    pub fn new(store: R) -> Self {
        Self {
            store,
            owner_entity_set: "accounts".to_string(),
        }
    }

    /// Entity set used in the owner binding (`/<set>(<owner>)`).
    pub fn with_owner_entity_set(mut self, owner_entity_set: impl Into<String>) -> Self {
        self.owner_entity_set = owner_entity_set.into();
        self
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Encode the file and create a record bound to `owner_id`.
    pub fn save(&self, handle: &FileHandle, owner_id: &str) -> Result<RecordId, BridgeError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            log::error!("No owner id provided; '{}' was not saved", handle.name());
            return Err(BridgeError::MissingOwner);
        }

        let save_failed = |source: StoreError| {
            log::error!("Failed to save '{}': {}", handle.name(), source);
            BridgeError::SaveFailed {
                name: handle.name().to_string(),
                source,
            }
        };

        let owner = normalize_owner_id(owner_id).map_err(save_failed)?;
        let request = CreateFileRequest::new(
            &self.owner_entity_set,
            owner,
            handle.name(),
            codec::encode(handle.bytes()),
            handle.mime_type(),
        );

        let id = self.store.create(&request).map_err(save_failed)?;
        log::info!("Saved '{}' with record id {}", handle.name(), id);
        Ok(id)
    }

    pub fn try_list_for_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, BridgeError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(BridgeError::MissingOwner);
        }

        let records = self
            .store
            .list_by_owner(owner_id)
            .map_err(|source| BridgeError::ListFailed {
                owner: owner_id.to_string(),
                source,
            })?;
        log::info!("Retrieved {} file records for owner {}", records.len(), owner_id);
        Ok(records)
    }

    /// Like [`Self::try_list_for_owner`], but any failure is logged and
    /// yields an empty list.
    pub fn list_for_owner(&self, owner_id: &str) -> Vec<FileRecord> {
        match self.try_list_for_owner(owner_id) {
            Ok(records) => records,
            Err(BridgeError::MissingOwner) => {
                log::warn!("No owner id provided; skipping file retrieval");
                Vec::new()
            }
            Err(e) => {
                log::error!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn delete(&self, id: &RecordId) -> Result<(), BridgeError> {
        self.store.delete(id).map_err(|source| {
            log::error!("Failed to delete record {}: {}", id, source);
            BridgeError::DeleteFailed { id: id.clone(), source }
        })?;
        log::info!("Deleted record {}", id);
        Ok(())
    }
}
