//! Text Extraction Adapter: turns an uploaded resume document into plain text.
//!
//! Two formats are accepted: `.pdf` (paginated: per-page text joined by blank
//! lines, empty pages skipped) and `.docx` (flowed: non-empty paragraphs joined
//! by single newlines). Anything else is rejected with `UnsupportedFormat`.

mod docx;

use thiserror::Error;

/// Below this many characters (after trimming) the text is probably a scan.
pub const OCR_MIN_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Document formats the adapter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Paginated layout document (`.pdf`).
    Pdf,
    /// Flowed word-processing document (`.docx`).
    Docx,
}

impl DocumentFormat {
    /// Resolves a file extension (with or without the leading dot, any case).
    pub fn from_extension(extension: &str) -> Result<Self, ExtractError> {
        let ext = normalize_extension(extension);
        match ext.as_str() {
            ".pdf" => Ok(DocumentFormat::Pdf),
            ".docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
        }
    }
}

/// Lowercases and ensures a single leading dot: `"PDF"` → `".pdf"`.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}

/// Extracts plain text from document bytes, dispatching on the declared extension.
///
/// CPU-bound; async callers should run this inside `tokio::task::spawn_blocking`.
pub fn extract_text(bytes: &[u8], extension: &str) -> Result<String, ExtractError> {
    match DocumentFormat::from_extension(extension)? {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Docx => docx::extract_paragraphs(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// True when the text is empty or too short to be a real text-layer resume.
/// OCR itself is not performed; callers log and continue with the text as-is.
pub fn needs_ocr(text: &str) -> bool {
    text.is_empty() || text.trim().chars().count() < OCR_MIN_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_names_it() {
        let err = extract_text(b"hello", ".txt").unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(ext) => assert_eq!(ext, ".txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_extension("PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_extension(".DocX").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_doc_extension_is_not_docx() {
        assert!(matches!(
            DocumentFormat::from_extension(".doc"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_invalid_pdf_returns_pdf_error() {
        let err = extract_text(b"not a pdf", ".pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = vec![
            "  Page one  ".to_string(),
            "   ".to_string(),
            "Page three\n".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Page one\n\nPage three");
    }

    #[test]
    fn test_needs_ocr_empty() {
        assert!(needs_ocr(""));
        assert!(needs_ocr("   \n  "));
    }

    #[test]
    fn test_needs_ocr_threshold() {
        let short = "x".repeat(199);
        let enough = format!("  {}  ", "x".repeat(200));
        assert!(needs_ocr(&short));
        assert!(!needs_ocr(&enough));
    }
}
