//! Record store HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Every call carries
//! the OData version headers; creates ask for the stored representation
//! back so the new id arrives in the body.

use std::time::Duration;

use filedock_config::Settings;
use reqwest::blocking::{RequestBuilder, Response};
use serde::Serialize;
use thiserror::Error;

use crate::record::{CreateFileRequest, FileRecord, ODataCollection, RecordId};

const DEFAULT_API_VERSION: &str = "v9.2";
const DEFAULT_ENTITY_SET: &str = "new_files";
const DEFAULT_OWNER_ENTITY_SET: &str = "accounts";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Owner id contains characters that cannot appear in a key
    #[error("invalid owner id: {0:?}")]
    InvalidOwner(String),
    /// Record id contains characters that cannot appear in a key
    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Where the file records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEndpoint {
    /// Organization root, without trailing slash
    pub api_base: String,
    pub api_version: String,
    pub entity_set: String,
    pub owner_entity_set: String,
    pub timeout: Duration,
}

impl StoreEndpoint {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            entity_set: DEFAULT_ENTITY_SET.to_string(),
            owner_entity_set: DEFAULT_OWNER_ENTITY_SET.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_base: settings.store_api_base.trim_end_matches('/').to_string(),
            api_version: settings.store_api_version.clone(),
            entity_set: settings.store_entity_set.clone(),
            owner_entity_set: settings.store_owner_entity_set.clone(),
            timeout: Duration::from_secs(settings.store_timeout_secs),
        }
    }

    /// `{api_base}/api/data/{version}/{entity_set}`
    pub fn collection_url(&self) -> String {
        format!("{}/api/data/{}/{}", self.api_base, self.api_version, self.entity_set)
    }
}

/// Record store client (blocking).
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::blocking::Client,
    endpoint: StoreEndpoint,
    token: Option<String>,
}

impl StoreClient {
    pub fn new(endpoint: StoreEndpoint) -> Result<Self, StoreError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("filedock/{}", env!("CARGO_PKG_VERSION")))
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            token: None,
        })
    }

    /// Attach a bearer token handed over by the host.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &StoreEndpoint {
        &self.endpoint
    }

    /// Create a file record. Returns the server-assigned id.
    pub fn create_file(&self, request: &CreateFileRequest) -> Result<RecordId, StoreError> {
        let url = self.endpoint.collection_url();
        let response = self.post_json(&url, request)?;

        let entity_url = response
            .headers()
            .get("OData-EntityId")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().map_err(|e| StoreError::Parse(e.to_string()))?;

        if !body.trim().is_empty() {
            let json: serde_json::Value =
                serde_json::from_str(&body).map_err(|e| StoreError::Parse(e.to_string()))?;
            if let Some(id) = json["new_filesid"].as_str() {
                return Ok(RecordId::new(id));
            }
        }

        // 204 No Content: the id is only in the entity URL
        entity_url
            .as_deref()
            .and_then(id_from_entity_url)
            .map(RecordId::new)
            .ok_or_else(|| StoreError::Parse("Missing new_filesid in response".into()))
    }

    /// List the file records owned by `owner_id` (first page only).
    pub fn list_files_for_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, StoreError> {
        let owner = normalize_owner_id(owner_id)?;
        let url = format!(
            "{}?$filter=_new_accountid_value%20eq%20{}",
            self.endpoint.collection_url(),
            owner
        );

        let response = self.get(&url)?;
        let collection: ODataCollection<FileRecord> =
            response.json().map_err(|e| StoreError::Parse(e.to_string()))?;

        if collection.next_link.is_some() {
            log::warn!(
                "Owner {} has more file records than one page; showing the first {}",
                owner,
                collection.value.len()
            );
        }

        Ok(collection.value)
    }

    /// Delete a file record.
    pub fn delete_file(&self, id: &RecordId) -> Result<(), StoreError> {
        let key = normalize_key(id.as_str()).ok_or_else(|| StoreError::InvalidRecordId(id.to_string()))?;
        let url = format!("{}({})", self.endpoint.collection_url(), key);
        self.delete(&url)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn odata(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get(&self, url: &str) -> Result<Response, StoreError> {
        let response = self
            .odata(self.http.get(url))
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response, StoreError> {
        let response = self
            .odata(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        check_status(response)
    }

    fn delete(&self, url: &str) -> Result<(), StoreError> {
        let response = self
            .odata(self.http.delete(url))
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        check_status(response)?;
        Ok(())
    }
}

// ── Free functions ──────────────────────────────────────────────────

fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(StoreError::Http(status.as_u16(), body));
    }
    Ok(response)
}

/// Validate an owner id for use in a filter or binding. Surrounding braces
/// (`{GUID}` form) are accepted and stripped.
pub fn normalize_owner_id(owner_id: &str) -> Result<&str, StoreError> {
    normalize_key(owner_id).ok_or_else(|| StoreError::InvalidOwner(owner_id.to_string()))
}

fn normalize_key(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '{' | '}' | '-'))
    {
        return None;
    }
    let key = trimmed.trim_start_matches('{').trim_end_matches('}');
    if key.is_empty() || key.contains(['{', '}']) {
        return None;
    }
    Some(key)
}

/// `https://org/api/data/v9.2/new_files(abc)` -> `abc`
fn id_from_entity_url(url: &str) -> Option<&str> {
    let start = url.rfind('(')?;
    let end = start + url[start..].find(')')?;
    let id = &url[start + 1..end];
    (!id.is_empty()).then_some(id)
}
