use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use dealplan_core::models::{GenerateDspRequest, GenerateDspResponse};
use std::sync::Arc;

/// Generate a new Deal Strategy Plan version from the opportunity's inputs.
///
/// Runs synchronously: extraction, the AI call (with one corrective retry),
/// rendering and storage all happen within the request.
#[utoipa::path(
    post,
    path = "/api/v1/dsp/generate",
    tag = "dsp",
    request_body = GenerateDspRequest,
    responses(
        (status = 200, description = "DSP generated", body = GenerateDspResponse),
        (status = 400, description = "Invalid request, no inputs or insufficient text", body = ErrorResponse),
        (status = 402, description = "AI credits exhausted", body = ErrorResponse),
        (status = 404, description = "Opportunity not found", body = ErrorResponse),
        (status = 429, description = "AI gateway rate limit", body = ErrorResponse),
        (status = 500, description = "Generation or storage failure", body = ErrorResponse),
        (status = 504, description = "AI gateway timeout", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(state, user, request), fields(opportunity_id = request.opportunity_id, actor = %user.actor()))]
pub async fn generate_dsp(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<GenerateDspRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let generated = state
        .dsp
        .generate(request.opportunity_id, request.format, user.actor())
        .await?;

    Ok(Json(GenerateDspResponse {
        success: true,
        artifact_id: generated.artifact.artifact_id,
        artifact_url: generated.artifact.artifact_url.clone(),
        version: generated.artifact.version,
        storage_path: generated.storage_path,
        format: generated.format,
        message: "Deal Strategy Plan generated successfully".to_string(),
    }))
}
