// Host seam
//
// The embedding page supplies the owner id and is told when the bound
// output changes. Everything else the control keeps to itself.

use serde::Serialize;

use crate::registry::FileEntry;

pub trait Host {
    /// Id of the owning record, if the page has one yet.
    fn owner_id(&self) -> Option<String>;

    /// The bound output value changed; the host should re-read it.
    fn notify_output_changed(&mut self);

    /// Redraw the file list. Headless hosts can ignore it.
    fn show_files(&mut self, _files: &[FileEntry]) {}
}

/// Value handed back to the host's bound property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOutput {
    #[serde(rename = "FileData")]
    pub file_data: String,
}
