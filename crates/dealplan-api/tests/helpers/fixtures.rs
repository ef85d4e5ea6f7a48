//! Test fixtures: request bodies and file blobs.

use axum_test::multipart::{MultipartForm, Part};

/// Bytes with a PDF header; enough for MIME checks, not for text extraction
pub fn pdf_bytes(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size.max(data.len()), b'0');
    data
}

/// Multipart form with a single `file` part
pub fn file_form(file_name: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_type(content_type.to_string()),
    )
}

pub fn pdf_form(file_name: &str) -> MultipartForm {
    file_form(file_name, "application/pdf", pdf_bytes(2048))
}
