//! Preview routing by declared content type.
//!
//! Classification trusts the type the caller declared. Content is never
//! sniffed: a PNG declared as `text/plain` previews as text.

pub const PDF: &str = "application/pdf";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS: &str = "application/vnd.ms-excel";
pub const XLSM: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";
pub const XLSB: &str = "application/vnd.ms-excel.sheet.binary.macroEnabled.12";
pub const ODS: &str = "application/vnd.oasis.opendocument.spreadsheet";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOCM: &str = "application/vnd.ms-word.document.macroEnabled.12";

const SPREADSHEET_TYPES: &[&str] = &[XLSX, XLS, XLSM, XLSB, ODS];
const DOCUMENT_TYPES: &[&str] = &[DOCX, DOCM];

/// Which rendering path a file takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    /// Embedded document viewer
    Pdf,
    /// Tabbed sheet grid
    Tabular,
    /// Converted word-processing markup
    Document,
    Image,
    /// Preformatted text fallback
    RawText,
}

impl PreviewKind {
    /// Classify a declared content type. Matching ignores case and any
    /// parameters after `;`.
    pub fn classify(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if essence == PDF {
            PreviewKind::Pdf
        } else if SPREADSHEET_TYPES.iter().any(|t| t.eq_ignore_ascii_case(&essence)) {
            PreviewKind::Tabular
        } else if DOCUMENT_TYPES.iter().any(|t| t.eq_ignore_ascii_case(&essence)) {
            PreviewKind::Document
        } else if essence.starts_with("image/") {
            PreviewKind::Image
        } else {
            PreviewKind::RawText
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literal_types() {
        assert_eq!(PreviewKind::classify("application/pdf"), PreviewKind::Pdf);
        assert_eq!(
            PreviewKind::classify("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            PreviewKind::Tabular
        );
        assert_eq!(
            PreviewKind::classify("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            PreviewKind::Document
        );
        assert_eq!(PreviewKind::classify("image/png"), PreviewKind::Image);
        assert_eq!(PreviewKind::classify("text/plain"), PreviewKind::RawText);
    }

    #[test]
    fn test_classify_legacy_and_macro_spreadsheets() {
        assert_eq!(PreviewKind::classify("application/vnd.ms-excel"), PreviewKind::Tabular);
        assert_eq!(PreviewKind::classify(XLSM), PreviewKind::Tabular);
        assert_eq!(PreviewKind::classify(ODS), PreviewKind::Tabular);
        assert_eq!(PreviewKind::classify(DOCM), PreviewKind::Document);
    }

    #[test]
    fn test_classify_ignores_case_and_parameters() {
        assert_eq!(PreviewKind::classify("Application/PDF"), PreviewKind::Pdf);
        assert_eq!(PreviewKind::classify("image/svg+xml; charset=utf-8"), PreviewKind::Image);
        assert_eq!(PreviewKind::classify("text/csv; charset=utf-8"), PreviewKind::RawText);
    }

    #[test]
    fn test_classify_empty_type_is_raw_text() {
        assert_eq!(PreviewKind::classify(""), PreviewKind::RawText);
        assert_eq!(PreviewKind::classify("application/octet-stream"), PreviewKind::RawText);
    }
}
