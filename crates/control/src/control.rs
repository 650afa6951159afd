//! The control proper.
//!
//! Owns the registry and the preview dispatcher, and reports every change
//! of the file list to the host. Saves are split like previews: [`attach`]
//! registers the file and returns a [`SaveJob`], the job runs against the
//! bridge wherever the host likes, and [`complete_save`] records the
//! result.
//!
//! [`attach`]: FileUploaderControl::attach
//! [`complete_save`]: FileUploaderControl::complete_save

use filedock_config::Settings;
use filedock_core::{codec, FileHandle};
use filedock_store_client::{RecordId, StoreClient, StoreEndpoint, StoreError};

use crate::bridge::{BridgeError, PersistenceBridge, RecordStore};
use crate::host::{ControlOutput, Host};
use crate::preview::{PreviewDispatcher, PreviewOptions, PreviewOutcome, PreviewRequest, PreviewSurface};
use crate::registry::{FileId, FileRegistry, SyncState};

/// A pending save, detached from the control.
#[derive(Debug, Clone)]
pub struct SaveJob {
    file: FileId,
    handle: FileHandle,
    owner_id: Option<String>,
}

impl SaveJob {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn run<R: RecordStore>(self, bridge: &PersistenceBridge<R>) -> SaveCompletion {
        let result = bridge.save(&self.handle, self.owner_id.as_deref().unwrap_or_default());
        SaveCompletion {
            file: self.file,
            result,
        }
    }
}

#[derive(Debug)]
pub struct SaveCompletion {
    file: FileId,
    result: Result<RecordId, BridgeError>,
}

impl SaveCompletion {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn result(&self) -> &Result<RecordId, BridgeError> {
        &self.result
    }
}

pub struct FileUploaderControl<H: Host, S: PreviewSurface, R: RecordStore> {
    host: H,
    registry: FileRegistry,
    preview: PreviewDispatcher<S>,
    bridge: PersistenceBridge<R>,
    propagate_deletes: bool,
}

impl<H: Host, S: PreviewSurface> FileUploaderControl<H, S, StoreClient> {
    /// Build a control talking to the store configured in `settings`.
    pub fn connect(host: H, surface: S, settings: &Settings) -> Result<Self, StoreError> {
        let endpoint = StoreEndpoint::from_settings(settings);
        let owner_entity_set = endpoint.owner_entity_set.clone();
        let bridge = PersistenceBridge::new(StoreClient::new(endpoint)?).with_owner_entity_set(owner_entity_set);
        Ok(Self::from_settings(host, surface, bridge, settings))
    }
}

impl<H: Host, S: PreviewSurface, R: RecordStore> FileUploaderControl<H, S, R> {
    pub fn new(host: H, surface: S, bridge: PersistenceBridge<R>, options: PreviewOptions) -> Self {
        Self {
            host,
            registry: FileRegistry::new(),
            preview: PreviewDispatcher::new(surface, options),
            bridge,
            propagate_deletes: false,
        }
    }

    pub fn from_settings(host: H, surface: S, bridge: PersistenceBridge<R>, settings: &Settings) -> Self {
        Self::new(host, surface, bridge, PreviewOptions::from_settings(settings))
            .with_propagate_deletes(settings.store_propagate_deletes)
    }

    /// Also delete the stored record when a saved file is removed.
    pub fn with_propagate_deletes(mut self, propagate: bool) -> Self {
        self.propagate_deletes = propagate;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &PreviewDispatcher<S> {
        &self.preview
    }

    pub fn surface(&self) -> &S {
        self.preview.surface()
    }

    pub fn bridge(&self) -> &PersistenceBridge<R> {
        &self.bridge
    }

    /// Load the owner's existing records into the list. Without an owner
    /// nothing is requested; a failed listing leaves the list as it was.
    pub fn init(&mut self) {
        let owner_id = match self.host.owner_id() {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                log::warn!("No owner id available; skipping retrieval of stored files");
                return;
            }
        };

        let records = self.bridge.list_for_owner(&owner_id);
        if records.is_empty() {
            return;
        }

        for record in records {
            let handle = FileHandle::deferred(record.name, record.mime_type.unwrap_or_default());
            self.registry.add_saved(handle, record.id);
        }
        self.changed();
    }

    /// Register a file and hand back the save to run.
    pub fn attach(&mut self, handle: FileHandle) -> SaveJob {
        let file = self.registry.add(handle.clone());
        log::debug!("Attached '{}' as {}", handle.name(), file);
        self.changed();

        SaveJob {
            file,
            handle,
            owner_id: self.host.owner_id(),
        }
    }

    /// Record the result of a save. Returns false if the file was removed
    /// while the save was in flight.
    pub fn complete_save(&mut self, completion: SaveCompletion) -> bool {
        let SaveCompletion { file, result } = completion;
        let sync = match &result {
            Ok(id) => SyncState::Saved(id.clone()),
            Err(_) => SyncState::Failed,
        };

        if !self.registry.set_sync(file, sync) {
            log::debug!("{} was removed before its save finished", file);
            if let (Ok(id), true) = (&result, self.propagate_deletes) {
                // Best effort; failure is already logged by the bridge
                let _ = self.bridge.delete(id);
            }
            return false;
        }

        self.host.show_files(self.registry.entries());
        true
    }

    /// Attach and save inline.
    pub fn attach_and_save(&mut self, handle: FileHandle) -> FileId {
        let job = self.attach(handle);
        let file = job.file();
        let completion = job.run(&self.bridge);
        self.complete_save(completion);
        file
    }

    /// Remove a file from the list. Absent ids are a no-op.
    pub fn remove(&mut self, file: FileId) -> bool {
        let Some(entry) = self.registry.remove(file) else {
            return false;
        };

        if self.preview.state().file == Some(file) {
            self.preview.close();
        }

        if self.propagate_deletes {
            if let Some(id) = entry.sync.record_id() {
                let _ = self.bridge.delete(id);
            }
        }

        log::debug!("Removed '{}' ({})", entry.handle.name(), file);
        self.changed();
        true
    }

    /// Open the preview for a file, rendering inline.
    pub fn preview(&mut self, file: FileId) -> bool {
        let Some(entry) = self.registry.get(file) else {
            return false;
        };
        let handle = entry.handle.clone();
        self.preview.open(file, &handle);
        true
    }

    /// Start a preview whose rendering the host runs itself.
    pub fn request_preview(&mut self, file: FileId) -> Option<PreviewRequest> {
        let handle = self.registry.get(file)?.handle.clone();
        Some(self.preview.request(file, &handle))
    }

    pub fn complete_preview(&mut self, outcome: PreviewOutcome) -> bool {
        self.preview.complete(outcome)
    }

    pub fn select_sheet(&mut self, name: &str) -> bool {
        self.preview.select_sheet(name)
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
    }

    /// Data URL for downloading a file. None for unknown ids and for
    /// entries whose content was never fetched.
    pub fn download_url(&self, file: FileId) -> Option<String> {
        let entry = self.registry.get(file)?;
        if entry.handle.is_deferred() {
            return None;
        }
        Some(codec::data_url(entry.handle.mime_type(), entry.handle.bytes()))
    }

    pub fn output(&self) -> ControlOutput {
        ControlOutput {
            file_data: self.registry.output(),
        }
    }

    fn changed(&mut self) {
        self.host.show_files(self.registry.entries());
        self.host.notify_output_changed();
    }
}

impl<H: Host, S: PreviewSurface, R: RecordStore> std::fmt::Debug for FileUploaderControl<H, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUploaderControl")
            .field("files", &self.registry.len())
            .field("preview", self.preview.state())
            .field("propagate_deletes", &self.propagate_deletes)
            .finish()
    }
}
