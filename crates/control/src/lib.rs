//! File attachment control.
//!
//! Wires the file registry, the preview dispatcher and the record store
//! bridge to a host. All state lives on one thread; slow work (rendering a
//! preview, saving a file) is packaged as a self-contained job the host may
//! run elsewhere and hand back through the matching `complete_*` call.

pub mod bridge;
pub mod control;
pub mod host;
pub mod preview;
pub mod registry;

pub use bridge::{BridgeError, PersistenceBridge, RecordStore};
pub use control::{FileUploaderControl, SaveCompletion, SaveJob};
pub use host::{ControlOutput, Host};
pub use preview::{
    MemorySurface, PreviewDispatcher, PreviewOptions, PreviewOutcome, PreviewPhase, PreviewRequest, PreviewState,
    PreviewSurface, PreviewToken,
};
pub use registry::{FileEntry, FileId, FileRegistry, SyncState};
