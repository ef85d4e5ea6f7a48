//! Plain-text extraction from uploaded inputs

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Text extraction failed: {0}")]
    Extraction(String),
}

/// Turns raw document bytes into text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: Bytes) -> Result<String, ExtractError>;
}

#[cfg(feature = "pdf")]
pub use pdf::PdfTextExtractor;

#[cfg(feature = "pdf")]
mod pdf {
    use super::*;

    /// PDF extraction with `pdf-extract`, run on the blocking pool
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfTextExtractor;

    impl PdfTextExtractor {
        pub fn new() -> Self {
            Self
        }
    }

    fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractError::Extraction(e.to_string()))
    }

    #[async_trait]
    impl TextExtractor for PdfTextExtractor {
        async fn extract_text(&self, data: Bytes) -> Result<String, ExtractError> {
            let size = data.len();
            let text = tokio::task::spawn_blocking(move || extract_pdf_text(&data))
                .await
                .map_err(|e| ExtractError::Extraction(format!("extraction task aborted: {}", e)))??;

            tracing::debug!(size_bytes = size, text_len = text.len(), "PDF text extracted");
            Ok(text)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_garbage_bytes_fail_extraction() {
            let result = PdfTextExtractor::new()
                .extract_text(Bytes::from_static(b"this is not a pdf"))
                .await;
            assert!(matches!(result, Err(ExtractError::Extraction(_))));
        }

        #[tokio::test]
        async fn test_empty_input_fails_extraction() {
            let result = PdfTextExtractor::new().extract_text(Bytes::new()).await;
            assert!(matches!(result, Err(ExtractError::Extraction(_))));
        }
    }
}
