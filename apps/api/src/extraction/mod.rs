//! Document Text Extractor: turns an uploaded PDF or Word file into plain text.
//!
//! Dispatch is by declared extension only. Nothing here touches the network or
//! the filesystem; callers hand over the bytes they already hold. Extraction is
//! CPU-bound and must run inside `tokio::task::spawn_blocking` when called from
//! a request handler.

pub mod docx;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Word document extraction failed: {0}")]
    Docx(String),
}

/// The document families the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// `.docx` and `.doc` both go through the Open XML reader.
    Word,
}

impl DocumentFormat {
    /// Resolves a declared extension (`"pdf"`, `".DOCX"`, ...) to a format.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Word),
            _ => Err(ExtractionError::UnsupportedFormat(if normalized.is_empty() {
                "<none>".to_string()
            } else {
                format!(".{normalized}")
            })),
        }
    }

    /// Resolves the format from an uploaded file name.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        Self::from_extension(extension)
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Extracts plain text from `bytes`, using `declared_extension` to pick the reader.
///
/// The format is decided before any byte is read, so an unsupported extension
/// fails without inspecting the payload.
pub fn extract(bytes: &[u8], declared_extension: &str) -> Result<String, ExtractionError> {
    match DocumentFormat::from_extension(declared_extension)? {
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes),
        DocumentFormat::Word => docx::extract_docx_text(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = extract(b"plain text resume", "txt").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref ext) if ext == ".txt"));
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        let err = DocumentFormat::from_filename("resume").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension(".Docx").unwrap(), DocumentFormat::Word);
        assert_eq!(DocumentFormat::from_extension("doc").unwrap(), DocumentFormat::Word);
        assert_eq!(
            DocumentFormat::from_filename("Jane.Doe.CV.pdf").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_corrupt_pdf_is_an_extraction_error() {
        let err = extract(b"definitely not a pdf", ".pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn test_corrupt_docx_is_an_extraction_error() {
        let err = extract(b"not a zip archive", "docx").unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }
}
