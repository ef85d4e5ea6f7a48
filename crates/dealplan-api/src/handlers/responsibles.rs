use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dealplan_core::models::{
    CreateResponsibleRequest, ListResponsiblesQuery, Responsible, UpdateResponsibleRequest,
};
use dealplan_core::AppError;

#[utoipa::path(
    get,
    path = "/api/v1/responsibles",
    tag = "responsibles",
    params(ListResponsiblesQuery),
    responses(
        (status = 200, description = "Responsibles ordered by name", body = Vec<Responsible>)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn list_responsibles(
    State(db): State<DbState>,
    Query(query): Query<ListResponsiblesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let responsibles = db
        .responsible_repository
        .list_responsibles(query.active)
        .await?;
    Ok(Json(responsibles))
}

#[utoipa::path(
    post,
    path = "/api/v1/responsibles",
    tag = "responsibles",
    request_body = CreateResponsibleRequest,
    responses(
        (status = 201, description = "Responsible created (active)", body = Responsible),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, request))]
pub async fn create_responsible(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<CreateResponsibleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let responsible = db
        .responsible_repository
        .create_responsible(&request.responsible_name)
        .await?;
    Ok((StatusCode::CREATED, Json(responsible)))
}

/// Rename, deactivate or reactivate a responsible
#[utoipa::path(
    put,
    path = "/api/v1/responsibles/{id}",
    tag = "responsibles",
    params(("id" = i32, Path, description = "Responsible ID")),
    request_body = UpdateResponsibleRequest,
    responses(
        (status = 200, description = "Responsible updated", body = Responsible),
        (status = 404, description = "Responsible not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, request))]
pub async fn update_responsible(
    State(db): State<DbState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateResponsibleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let responsible = db
        .responsible_repository
        .update_responsible(id, request.responsible_name.as_deref(), request.is_active)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Responsible {} not found", id)))?;

    if let Some(is_active) = request.is_active {
        tracing::info!(responsible_id = id, is_active, "Responsible activation changed");
    }
    Ok(Json(responsible))
}
