// Control settings
// Loaded from ~/.config/filedock/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Record store
    /// Organization root, e.g. `https://contoso.crm.dynamics.com`
    #[serde(rename = "store.apiBase")]
    pub store_api_base: String,

    #[serde(rename = "store.apiVersion")]
    pub store_api_version: String,

    /// Entity set holding file records
    #[serde(rename = "store.entitySet")]
    pub store_entity_set: String,

    /// Entity set of the owning records (used in the owner binding)
    #[serde(rename = "store.ownerEntitySet")]
    pub store_owner_entity_set: String,

    #[serde(rename = "store.timeoutSecs")]
    pub store_timeout_secs: u64,

    /// Delete the stored record when a saved file is removed
    #[serde(rename = "store.propagateDeletes")]
    pub store_propagate_deletes: bool,

    // Preview
    #[serde(rename = "preview.maxHeightPx")]
    pub preview_max_height_px: u32,

    #[serde(rename = "preview.fontFamily")]
    pub preview_font_family: String,

    #[serde(rename = "preview.maxRows")]
    pub preview_max_rows: usize,

    #[serde(rename = "preview.maxCols")]
    pub preview_max_cols: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Store
            store_api_base: String::new(), // Empty = host supplies it
            store_api_version: "v9.2".to_string(),
            store_entity_set: "new_files".to_string(),
            store_owner_entity_set: "accounts".to_string(),
            store_timeout_secs: 30,
            store_propagate_deletes: false,
            // Preview
            preview_max_height_px: 500,
            preview_font_family: "Calibri, Arial, sans-serif".to_string(),
            preview_max_rows: 10_000,
            preview_max_cols: 702,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Record store (OData endpoint)
    "store.apiBase": "",
    "store.apiVersion": "v9.2",
    "store.entitySet": "new_files",
    "store.ownerEntitySet": "accounts",
    "store.timeoutSecs": 30,

    // Delete the stored record when a saved file is removed from the list
    "store.propagateDeletes": false,

    // Preview area
    "preview.maxHeightPx": 500,
    "preview.fontFamily": "Calibri, Arial, sans-serif",

    // Spreadsheet previews stop at this many rows / columns per sheet
    "preview.maxRows": 10000,
    "preview.maxCols": 702
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("filedock");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with commented
    /// defaults; an unreadable or malformed one yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring `//` comment lines
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default {}: {}", path.display(), e);
        }
    }
}
