//! Proxies to the document-automation webhooks that publish files to Drive

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::webhook::{ArtifactReply, UploadForward};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_file_size};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use dealplan_core::models::{
    GenerateArtifactRequest, GenerateArtifactResponse, UploadProxyResponse,
};
use dealplan_core::{AppError, UpstreamKind};
use std::sync::Arc;

/// Value stored in both gdrive fields when the webhook reply is unusable
const GDRIVE_ERROR_MARKER: &str = "error";

/// Forward an uploaded PDF to the upload webhook
#[utoipa::path(
    post,
    path = "/api/v1/proxy/upload",
    tag = "proxy",
    request_body(content = String, description = "Multipart: file, input_id, opportunity_id, file_name, uploaded_by", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File published", body = UploadProxyResponse),
        (status = 400, description = "Missing file or not a PDF", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Webhook unreachable or invalid reply", body = ErrorResponse),
        (status = 504, description = "Webhook timeout", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(state, user, multipart), fields(actor = %user.actor()))]
pub async fn proxy_upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut form = read_upload_form(multipart).await?;
    let file = form.require_file()?;
    validate_file_size(file.data.len(), state.files.max_input_size_bytes)?;

    let text_field = |name: &str| form.field(name).unwrap_or_default().to_string();
    let forward = UploadForward {
        file_name: form
            .field("file_name")
            .map(String::from)
            .unwrap_or_else(|| file.file_name.clone()),
        input_id: text_field("input_id"),
        opportunity_id: text_field("opportunity_id"),
        uploaded_by: form
            .field("uploaded_by")
            .unwrap_or(user.actor())
            .to_string(),
        content_type: file.content_type.clone(),
        file: file.data,
    };

    let published = state.webhooks.forward_upload(forward).await?;

    tracing::info!(gdrive_file_name = %published.gdrive_file_name, "Upload forwarded");
    Ok(Json(UploadProxyResponse {
        success: true,
        gdrive_file_name: published.gdrive_file_name,
        gdrive_web_url: published.gdrive_web_url,
    }))
}

/// Ask the artifact webhook to publish an artifact and record where it landed
#[utoipa::path(
    post,
    path = "/api/v1/proxy/generate-artifact",
    tag = "proxy",
    request_body = GenerateArtifactRequest,
    responses(
        (status = 200, description = "Artifact published", body = GenerateArtifactResponse),
        (status = 400, description = "Invalid ids", body = ErrorResponse),
        (status = 404, description = "Artifact not found for this opportunity", body = ErrorResponse),
        (status = 502, description = "Webhook unreachable or invalid reply", body = ErrorResponse),
        (status = 504, description = "Webhook timeout", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(state, request), fields(opportunity_id = request.opportunity_id, artifact_id = request.artifact_id))]
pub async fn proxy_generate_artifact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<GenerateArtifactRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let artifacts = &state.db.artifact_repository;

    artifacts
        .get_artifact(request.artifact_id)
        .await?
        .filter(|artifact| artifact.opportunity_id == request.opportunity_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Artifact {} not found for opportunity {}",
                request.artifact_id, request.opportunity_id
            ))
        })?;

    let published = match state
        .webhooks
        .request_artifact(request.opportunity_id, request.artifact_id)
        .await?
    {
        ArtifactReply::Valid(published) => published,
        ArtifactReply::Invalid(reason) => {
            artifacts
                .update_gdrive(request.artifact_id, GDRIVE_ERROR_MARKER, GDRIVE_ERROR_MARKER)
                .await?;
            tracing::warn!(reason = %reason, "Artifact webhook returned an unusable reply");
            return Err(AppError::Upstream {
                kind: UpstreamKind::Gateway,
                message: format!("Invalid artifact webhook response: {}", reason),
            }
            .into());
        }
    };

    artifacts
        .update_gdrive(
            request.artifact_id,
            &published.gdrive_file_name,
            &published.gdrive_web_url,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artifact {} not found", request.artifact_id)))?;

    Ok(Json(GenerateArtifactResponse {
        success: true,
        artifact_id: request.artifact_id,
        gdrive_file_name: published.gdrive_file_name,
        gdrive_web_url: published.gdrive_web_url,
    }))
}
