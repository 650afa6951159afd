// In-memory file handles

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A file attached to the form.
///
/// Content is shared so a handle can be handed to background work without
/// copying. A handle rebuilt from a stored record is *deferred*: it carries a
/// name and type but no content.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
    deferred: bool,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::from(bytes),
            deferred: false,
        }
    }

    /// A handle reconstructed from a stored record without fetching content.
    pub fn deferred(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::from(Vec::<u8>::new()),
            deferred: true,
        }
    }

    /// Read a file from disk. The content type is declared from the file
    /// extension, the same way a browser file picker declares it.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type; may be empty.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_handle() {
        let handle = FileHandle::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(handle.name(), "notes.txt");
        assert_eq!(handle.mime_type(), "text/plain");
        assert_eq!(handle.bytes(), b"hello");
        assert!(!handle.is_deferred());
    }

    #[test]
    fn test_deferred_handle_is_empty() {
        let handle = FileHandle::deferred("report.xlsx", "");
        assert!(handle.is_deferred());
        assert!(handle.is_empty());
    }

    #[test]
    fn test_clone_shares_content() {
        let handle = FileHandle::new("a.bin", "application/octet-stream", vec![1, 2, 3]);
        let copy = handle.clone();
        assert_eq!(copy.bytes().as_ptr(), handle.bytes().as_ptr());
    }

    #[test]
    fn test_from_path_declares_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let handle = FileHandle::from_path(&path).unwrap();
        assert_eq!(handle.name(), "photo.png");
        assert_eq!(handle.mime_type(), "image/png");
        assert_eq!(handle.len(), 4);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileHandle::from_path(&dir.path().join("missing.txt")).is_err());
    }
}
