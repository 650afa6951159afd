//! Record store API client.
//!
//! This crate owns the wire contract with the record store: the file record
//! schema, the OData headers, the owner filter and the create/list/delete
//! calls. Blocking only. No retries.

mod client;
mod record;

pub use client::{normalize_owner_id, StoreClient, StoreEndpoint, StoreError};
pub use record::{CreateFileRequest, FileRecord, ODataCollection, RecordId};
