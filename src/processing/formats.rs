use async_trait::async_trait;
use docx_rs::read_docx;
use pdf_extract::extract_text_from_mem;
use thiserror::Error;
use tracing::warn;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Plain text files (.txt)
    PlainText,
    /// PDF files (.pdf)
    Pdf,
    /// Word documents (.docx)
    Word,
}

/// Errors that can occur during format handling
#[derive(Error, Debug)]
pub enum FormatError {
    /// Error when file format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error when the extracted text is blank
    #[error("Document appears to be empty: {0}")]
    EmptyDocument(String),

    /// Error during format-specific processing
    #[error("Processing error: {0}")]
    Processing(String),
}

/// Trait for format-specific document handlers
#[async_trait]
pub trait FormatHandler: Send + Sync {
    /// Extract text content from raw file bytes
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, FormatError>;
}

/// Detect document format from the MIME hint, falling back to the filename
/// extension. The MIME type wins when both are present and disagree.
pub fn detect_format(mime_hint: Option<&str>, filename: &str) -> Result<DocumentFormat, FormatError> {
    match mime_hint {
        Some("application/pdf") => return Ok(DocumentFormat::Pdf),
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
            return Ok(DocumentFormat::Word)
        }
        Some("text/plain") => return Ok(DocumentFormat::PlainText),
        _ => {}
    }

    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        Ok(DocumentFormat::Pdf)
    } else if lower.ends_with(".docx") {
        Ok(DocumentFormat::Word)
    } else if lower.ends_with(".txt") {
        Ok(DocumentFormat::PlainText)
    } else {
        Err(FormatError::UnsupportedFormat(format!(
            "{} ({})",
            mime_hint.unwrap_or("unknown"),
            filename
        )))
    }
}

/// Get appropriate format handler for document type
pub fn get_format_handler(format: DocumentFormat) -> Box<dyn FormatHandler> {
    match format {
        DocumentFormat::PlainText => Box::new(TextHandler),
        DocumentFormat::Pdf => Box::new(PdfHandler),
        DocumentFormat::Word => Box::new(WordHandler),
    }
}

/// Parse an uploaded document: detect its format, extract its text, and
/// reject blank results.
pub async fn parse_document(
    bytes: &[u8],
    mime_hint: Option<&str>,
    filename: &str,
) -> Result<String, FormatError> {
    let format = detect_format(mime_hint, filename)?;
    let text = get_format_handler(format).extract_text(bytes).await?;

    if text.trim().is_empty() {
        return Err(FormatError::EmptyDocument(filename.to_string()));
    }

    Ok(text)
}

/// Handler for plain text files
pub struct TextHandler;

#[async_trait]
impl FormatHandler for TextHandler {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, FormatError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| FormatError::Processing(format!("Invalid UTF-8 text: {}", e)))
    }
}

/// Handler for PDF files
pub struct PdfHandler;

#[async_trait]
impl FormatHandler for PdfHandler {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, FormatError> {
        extract_text_from_mem(bytes)
            .map_err(|e| FormatError::Processing(format!("PDF extraction error: {}", e)))
    }
}

/// Handler for Word documents
pub struct WordHandler;

#[async_trait]
impl FormatHandler for WordHandler {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, FormatError> {
        let docx = read_docx(bytes)
            .map_err(|e| FormatError::Processing(format!("Word document parsing error: {}", e)))?;

        // docx-rs exposes the parsed document as a JSON tree; walk
        // document.children -> paragraph runs -> text nodes.
        let value: serde_json::Value = serde_json::from_str(&docx.json())
            .map_err(|e| FormatError::Processing(format!("JSON parsing error: {}", e)))?;

        let mut text = String::new();
        let paragraphs = value
            .get("document")
            .and_then(|d| d.get("children"))
            .and_then(|c| c.as_array());

        let Some(paragraphs) = paragraphs else {
            warn!("DOCX document tree had no paragraph children");
            return Ok(text);
        };

        for paragraph in paragraphs {
            let runs = paragraph
                .get("data")
                .and_then(|d| d.get("children"))
                .and_then(|c| c.as_array());
            let Some(runs) = runs else { continue };

            for run in runs {
                let nodes = run
                    .get("data")
                    .and_then(|d| d.get("children"))
                    .and_then(|c| c.as_array());
                let Some(nodes) = nodes else { continue };

                for node in nodes {
                    if let Some(content) = node
                        .get("data")
                        .and_then(|d| d.get("text"))
                        .and_then(|t| t.as_str())
                    {
                        text.push_str(content);
                        text.push(' ');
                    }
                }
            }
            text.push('\n');
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_round_trips() {
        let text = parse_document(b"Side Letter between the parties", Some("text/plain"), "a.txt")
            .await
            .unwrap();
        assert_eq!(text, "Side Letter between the parties");
    }

    #[tokio::test]
    async fn blank_text_rejected() {
        let err = parse_document(b"   \n\n  ", Some("text/plain"), "blank.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, FormatError::EmptyDocument(_)));
    }

    #[test]
    fn mime_hint_takes_precedence_over_extension() {
        let format = detect_format(Some("application/pdf"), "mislabeled.txt").unwrap();
        assert_eq!(format, DocumentFormat::Pdf);
    }

    #[test]
    fn extension_fallback_without_mime() {
        assert_eq!(detect_format(None, "deck.PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(
            detect_format(None, "letter.docx").unwrap(),
            DocumentFormat::Word
        );
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(matches!(
            detect_format(Some("image/png"), "scan.png"),
            Err(FormatError::UnsupportedFormat(_))
        ));
    }
}
