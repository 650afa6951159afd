use thiserror::Error;

/// Failure to turn file bytes into a renderable form.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The bytes are not the format the declared content type claims.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The container opened but its content could not be converted.
    #[error("conversion failed: {0}")]
    Conversion(String),
}
