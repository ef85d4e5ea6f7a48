//! Public file route: serves a stored object by signed URL (no auth).
//! The local storage backend hands these URLs out for inputs and artifacts.

use crate::constants::PDF_CONTENT_TYPE;
use crate::error::HttpAppError;
use crate::state::FileState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use dealplan_core::models::DspFormat;
use dealplan_core::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SignedFileQuery {
    pub expires: Option<u64>,
    pub signature: Option<String>,
}

fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "html" | "htm" => DspFormat::Html.content_type(),
        "md" => DspFormat::Markdown.content_type(),
        _ => "application/octet-stream",
    }
}

/// Serve a file whose URL carries a valid, unexpired signature
#[tracing::instrument(skip(files, query), fields(operation = "get_signed_file"))]
pub async fn get_signed_file(
    State(files): State<FileState>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedFileQuery>,
) -> Result<Response, HttpAppError> {
    let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) else {
        return Err(AppError::Unauthorized("Missing signature parameters".to_string()).into());
    };

    files
        .url_signer
        .verify(&bucket, &key, expires, signature)
        .map_err(|e| {
            tracing::debug!(error = %e, bucket = %bucket, "Rejected signed file URL");
            AppError::Unauthorized(e.to_string())
        })?;

    let data = files.storage.download(&bucket, &key).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=60"),
        ],
        data,
    )
        .into_response())
}
