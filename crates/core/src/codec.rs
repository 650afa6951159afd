//! Radix-64 transport codec.
//!
//! File content travels to the record store inside JSON, so raw bytes are
//! carried as standard padded base64. The same encoding backs `data:` URLs,
//! which is how previews and downloads reference in-memory content.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Encoded content that is not valid standard base64.
#[derive(Debug, Error)]
#[error("malformed encoded content: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Encode bytes as padded base64 (standard alphabet).
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode padded base64 back into bytes. Exact inverse of [`encode`].
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(text)?)
}

/// Build a `data:` URL for the given content type and bytes.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    format!("data:{};base64,{}", mime_type, encode(bytes))
}
