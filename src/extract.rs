//! PDF text extraction.
//!
//! Wraps the `pdf-extract` crate: pages are concatenated in page order and
//! pages with no extractable text contribute nothing. A PDF that yields only
//! whitespace is reported as [`ExtractError::Empty`] so uploads of scanned
//! or image-only documents are rejected instead of indexed as nothing.

/// Extraction error. Callers map these to rejected uploads.
#[derive(Debug)]
pub enum ExtractError {
    /// The bytes could not be parsed as a PDF.
    Pdf(String),
    /// The PDF parsed but contained no extractable text.
    Empty,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Empty => write!(f, "Could not extract text from PDF"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract the full text of a PDF from raw bytes.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}
