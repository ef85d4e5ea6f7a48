use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dealplan_core::models::{Client, ClientRequest};
use dealplan_core::AppError;

fn client_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Client {} not found", id))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "clients",
    responses(
        (status = 200, description = "Clients ordered by name", body = Vec<Client>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn list_clients(State(db): State<DbState>) -> Result<impl IntoResponse, HttpAppError> {
    let clients = db.client_repository.list_clients().await?;
    Ok(Json(clients))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, request))]
pub async fn create_client(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<ClientRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let client = db
        .client_repository
        .create_client(&request.client_name)
        .await?;
    tracing::info!(client_id = client.client_id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Client not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn get_client(
    State(db): State<DbState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let client = db
        .client_repository
        .get_client(id)
        .await?
        .ok_or_else(|| client_not_found(id))?;
    Ok(Json(client))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Client renamed", body = Client),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, request))]
pub async fn update_client(
    State(db): State<DbState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ClientRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let client = db
        .client_repository
        .update_client(id, &request.client_name)
        .await?
        .ok_or_else(|| client_not_found(id))?;
    Ok(Json(client))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Client still referenced", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn delete_client(
    State(db): State<DbState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !db.client_repository.delete_client(id).await? {
        return Err(client_not_found(id).into());
    }
    tracing::info!(client_id = id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}
