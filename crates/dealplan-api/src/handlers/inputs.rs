use crate::auth::AuthUser;
use crate::constants::{DEFAULT_DOWNLOAD_URL_TTL_SECS, MAX_DOWNLOAD_URL_TTL_SECS, PDF_CONTENT_TYPE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::{DbState, FileState};
use crate::utils::upload::{read_upload_form, validate_file_size};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dealplan_core::models::{file_size_kb, DownloadUrlQuery, DownloadUrlResponse, Input, NewInput};
use dealplan_core::validation::sanitize_file_name;
use dealplan_core::AppError;
use dealplan_storage::keys::input_key;
use dealplan_storage::{StorageError, INPUTS_BUCKET};
use std::time::Duration;

fn input_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Input {} not found", id))
}

/// Requested URL lifetime, defaulted and clamped to the allowed window
pub fn clamp_expires_in(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_DOWNLOAD_URL_TTL_SECS)
        .clamp(1, MAX_DOWNLOAD_URL_TTL_SECS)
}

/// Upload a PDF input for an opportunity
#[utoipa::path(
    post,
    path = "/api/v1/opportunities/{id}/inputs",
    tag = "inputs",
    params(("id" = i32, Path, description = "Opportunity ID")),
    request_body(content = String, description = "PDF file (multipart field `file`)", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Input stored", body = Input),
        (status = 400, description = "Missing file or not a PDF", body = ErrorResponse),
        (status = 404, description = "Opportunity not found", body = ErrorResponse),
        (status = 409, description = "A file with this name already exists", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, files, user, multipart), fields(actor = %user.actor()))]
pub async fn upload_input(
    State(db): State<DbState>,
    State(files): State<FileState>,
    Path(opportunity_id): Path<i32>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    db.opportunity_repository
        .get_opportunity(opportunity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Opportunity {} not found", opportunity_id)))?;

    let mut form = read_upload_form(multipart).await?;
    let file = form.require_file()?;
    validate_file_size(file.data.len(), files.max_input_size_bytes)?;

    let sanitized = sanitize_file_name(&file.file_name);
    if sanitized.is_empty() {
        return Err(AppError::InvalidInput("File name is empty after sanitizing".to_string()).into());
    }
    let storage_path = input_key(opportunity_id, &sanitized);
    let size_bytes = file.data.len();

    files
        .storage
        .upload(INPUTS_BUCKET, &storage_path, PDF_CONTENT_TYPE, file.data.clone())
        .await?;

    let new_input = NewInput {
        opportunity_id,
        input_name: file.file_name.clone(),
        storage_path: storage_path.clone(),
        file_size_kb: file_size_kb(size_bytes),
        uploaded_by: user.actor().to_string(),
    };

    let input = match db.input_repository.create_input(new_input).await {
        Ok(input) => input,
        Err(e) => {
            if let Err(cleanup) = files.storage.delete(INPUTS_BUCKET, &storage_path).await {
                tracing::warn!(
                    error = %cleanup,
                    storage_path = %storage_path,
                    "Failed to remove stored file after insert failure"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        input_id = input.input_id,
        opportunity_id,
        size_bytes,
        storage_path = %storage_path,
        "Input uploaded"
    );
    Ok((StatusCode::CREATED, Json(input)))
}

#[utoipa::path(
    get,
    path = "/api/v1/opportunities/{id}/inputs",
    tag = "inputs",
    params(("id" = i32, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Inputs, newest first", body = Vec<Input>)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn list_inputs(
    State(db): State<DbState>,
    Path(opportunity_id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let inputs = db.input_repository.list_for_opportunity(opportunity_id).await?;
    Ok(Json(inputs))
}

#[utoipa::path(
    get,
    path = "/api/v1/inputs/{id}/download-url",
    tag = "inputs",
    params(("id" = i32, Path, description = "Input ID"), DownloadUrlQuery),
    responses(
        (status = 200, description = "Signed download URL", body = DownloadUrlResponse),
        (status = 404, description = "Input not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, files))]
pub async fn input_download_url(
    State(db): State<DbState>,
    State(files): State<FileState>,
    Path(id): Path<i32>,
    Query(query): Query<DownloadUrlQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let input = db
        .input_repository
        .get_input(id)
        .await?
        .ok_or_else(|| input_not_found(id))?;

    let expires_in = clamp_expires_in(query.expires_in);
    let url = files
        .storage
        .signed_url(INPUTS_BUCKET, &input.storage_path, Duration::from_secs(expires_in))
        .await?;

    Ok(Json(DownloadUrlResponse { url, expires_in }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inputs/{id}",
    tag = "inputs",
    params(("id" = i32, Path, description = "Input ID")),
    responses(
        (status = 204, description = "Input deleted"),
        (status = 404, description = "Input not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, files))]
pub async fn delete_input(
    State(db): State<DbState>,
    State(files): State<FileState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let input = db
        .input_repository
        .get_input(id)
        .await?
        .ok_or_else(|| input_not_found(id))?;

    match files.storage.delete(INPUTS_BUCKET, &input.storage_path).await {
        Ok(()) => {}
        Err(StorageError::NotFound(_)) => {
            tracing::warn!(storage_path = %input.storage_path, "Input file already gone from storage");
        }
        Err(e) => return Err(e.into()),
    }

    if !db.input_repository.delete_input(id).await? {
        return Err(input_not_found(id).into());
    }

    tracing::info!(input_id = id, "Input deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_in_is_clamped() {
        assert_eq!(clamp_expires_in(None), 60);
        assert_eq!(clamp_expires_in(Some(0)), 1);
        assert_eq!(clamp_expires_in(Some(3600)), 3600);
        assert_eq!(clamp_expires_in(Some(u64::MAX)), 604_800);
    }
}
