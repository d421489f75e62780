//! Text extraction from uploaded documents

use std::path::Path;
use tracing::debug;

use crate::core::errors::{Result, ServiceError};

/// Document formats we can pull text out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format
    Pdf,
    /// UTF-8 (or close to it) plain text
    PlainText,
}

impl DocumentKind {
    /// Decide the format from the file extension, then the MIME type
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("pdf") => return Ok(DocumentKind::Pdf),
            Some("txt") => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        match mime_type {
            Some("application/pdf") => Ok(DocumentKind::Pdf),
            Some(mime) if mime.starts_with("text/plain") => Ok(DocumentKind::PlainText),
            _ => Err(ServiceError::UnsupportedFileType {
                file_type: extension
                    .map(|ext| format!(".{}", ext))
                    .or_else(|| mime_type.map(str::to_string))
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    /// Extension reported back to API callers
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::PlainText => ".txt",
        }
    }
}

/// Extract the text content of a document
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String> {
    debug!("Extracting text from {} bytes ({:?})", bytes.len(), kind);

    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            ServiceError::ExtractionError {
                message: e.to_string(),
            }
        }),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Read a document from disk and extract its text
pub async fn extract_file(path: &Path) -> Result<String> {
    let kind = DocumentKind::detect(&path.to_string_lossy(), None)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ServiceError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    extract_text(&bytes, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(DocumentKind::detect("report.PDF", None).unwrap(), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::detect("notes.txt", Some("application/octet-stream")).unwrap(),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_detect_by_mime_type() {
        assert_eq!(
            DocumentKind::detect("upload", Some("application/pdf")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::detect("upload", Some("text/plain; charset=utf-8")).unwrap(),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_unsupported_type() {
        let err = DocumentKind::detect("slides.docx", Some("application/msword")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: .docx");
        assert!(err.is_validation());
    }

    #[test]
    fn test_plain_text_is_decoded_lossily() {
        let text = extract_text(b"hola \xff mundo", DocumentKind::PlainText).unwrap();
        assert_eq!(text, "hola \u{fffd} mundo");
    }

    #[test]
    fn test_invalid_pdf_is_extraction_error() {
        let err = extract_text(b"not a pdf", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, ServiceError::ExtractionError { .. }));
    }

    #[tokio::test]
    async fn test_extract_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "Hello there.").unwrap();

        assert_eq!(extract_file(&path).await.unwrap(), "Hello there.");
    }
}
