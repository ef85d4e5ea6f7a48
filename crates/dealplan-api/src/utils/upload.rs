//! Multipart parsing and checks shared by the upload handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use dealplan_core::AppError;
use std::collections::HashMap;

use crate::constants::PDF_CONTENT_TYPE;

/// The `file` part of a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A parsed multipart body: at most one file plus text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Non-empty text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::InvalidInput("file is required".to_string()))
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the whole form. Only one field named "file" is accepted.
///
/// The content type of the file is checked before its bytes are read.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            ensure_pdf(&content_type)?;

            let data = field.bytes().await.map_err(multipart_error)?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data,
            });
        } else if !field_name.is_empty() {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

/// Normalize MIME type by stripping parameters (e.g. "application/pdf; name=x" -> "application/pdf")
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Only PDF inputs are accepted
pub fn ensure_pdf(content_type: &str) -> Result<(), AppError> {
    if !normalize_mime_type(content_type).eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(AppError::InvalidInput(format!(
            "Only PDF files are allowed (received_type: {})",
            content_type
        )));
    }
    Ok(())
}

pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large (max_size: {} bytes, received_size: {} bytes)",
            max_size, file_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_pdf() {
        assert!(ensure_pdf("application/pdf").is_ok());
        assert!(ensure_pdf("Application/PDF; charset=binary").is_ok());
        let err = ensure_pdf("image/png").unwrap_err();
        assert!(err.to_string().contains("received_type: image/png"));
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(10, 10).is_ok());
        let err = validate_file_size(11, 10).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(err.to_string().contains("received_size: 11"));
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("input_id".into(), " 5 ".into());
        form.fields.insert("uploaded_by".into(), "  ".into());
        assert_eq!(form.field("input_id"), Some("5"));
        assert_eq!(form.field("uploaded_by"), None);
        assert!(form.require_file().is_err());
    }
}
