//! Wire types for file records.
//!
//! Field names follow the record store schema (`new_files` entity set).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored file as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "new_filesid")]
    pub id: RecordId,

    /// Empty when the store reports the column as null.
    #[serde(rename = "new_filename", default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Radix-64 content. Usually omitted from list responses.
    #[serde(rename = "new_filecontent", default, skip_serializing_if = "Option::is_none")]
    pub base64_content: Option<String>,

    #[serde(rename = "new_mimetype", default)]
    pub mime_type: Option<String>,

    /// Lookup value as the store reports it; some payloads use the
    /// navigation property name instead.
    #[serde(rename = "_new_accountid_value", alias = "new_accountid", default)]
    pub owner_id: Option<String>,

    #[serde(rename = "createdon", default)]
    pub created_on: Option<DateTime<Utc>>,
}

/// String columns come back as `null` when unset.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFileRequest {
    /// `/<owner entity set>(<owner id>)`
    #[serde(rename = "new_accountid@odata.bind")]
    pub owner_binding: String,

    #[serde(rename = "new_filename")]
    pub name: String,

    #[serde(rename = "new_filecontent")]
    pub base64_content: String,

    #[serde(rename = "new_mimetype")]
    pub mime_type: String,
}

impl CreateFileRequest {
    pub fn new(
        owner_entity_set: &str,
        owner_id: &str,
        name: impl Into<String>,
        base64_content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            owner_binding: format!("/{}({})", owner_entity_set, owner_id),
            name: name.into(),
            base64_content: base64_content.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// OData collection envelope: `{ "value": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}
