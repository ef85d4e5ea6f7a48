use crate::error::{ErrorResponse, HttpAppError};
use crate::state::DbState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use dealplan_core::models::Artifact;
use dealplan_core::AppError;

#[utoipa::path(
    get,
    path = "/api/v1/opportunities/{id}/artifacts",
    tag = "artifacts",
    params(("id" = i32, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Artifacts, newest version first", body = Vec<Artifact>)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn list_artifacts(
    State(db): State<DbState>,
    Path(opportunity_id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let artifacts = db
        .artifact_repository
        .list_for_opportunity(opportunity_id)
        .await?;
    Ok(Json(artifacts))
}

#[utoipa::path(
    get,
    path = "/api/v1/artifacts/{id}",
    tag = "artifacts",
    params(("id" = i32, Path, description = "Artifact ID")),
    responses(
        (status = 200, description = "Artifact", body = Artifact),
        (status = 404, description = "Artifact not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn get_artifact(
    State(db): State<DbState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let artifact = db
        .artifact_repository
        .get_artifact(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artifact {} not found", id)))?;
    Ok(Json(artifact))
}
