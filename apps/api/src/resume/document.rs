//! Text extraction from uploaded resume files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file '{0}': only PDF resumes are accepted")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Extraction(String),

    #[error("No text could be extracted from the document")]
    Empty,
}

/// Extracts plain text from an uploaded PDF held in memory.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    if !is_pdf_name(file_name) {
        return Err(DocumentError::UnsupportedFormat(file_name.to_string()));
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}

fn is_pdf_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_is_case_insensitive() {
        assert!(is_pdf_name("cv.pdf"));
        assert!(is_pdf_name("CV.PDF"));
        assert!(!is_pdf_name("cv.docx"));
        assert!(!is_pdf_name("pdf"));
    }

    #[test]
    fn test_non_pdf_is_rejected_before_parsing() {
        let err = extract_text("resume.txt", b"plain text").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(name) if name == "resume.txt"));
    }

    #[test]
    fn test_text_is_extracted_from_pdf() {
        let bytes = include_bytes!("../../tests/fixtures/resume.pdf");
        let text = extract_text("resume.pdf", bytes).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("PyTorch"));
    }

    #[test]
    fn test_garbage_pdf_bytes_fail_extraction() {
        let err = extract_text("resume.pdf", b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Extraction(_)));
    }
}
