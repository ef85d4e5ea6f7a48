use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::{DbState, FileState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dealplan_core::models::{
    CreateOpportunityRequest, ListOpportunitiesQuery, OpportunityDetail, OpportunityOverview,
    UpdateOpportunityRequest,
};
use dealplan_core::AppError;
use dealplan_storage::{StorageError, INPUTS_BUCKET};

fn opportunity_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Opportunity {} not found", id))
}

#[utoipa::path(
    get,
    path = "/api/v1/opportunities",
    tag = "opportunities",
    params(ListOpportunitiesQuery),
    responses(
        (status = 200, description = "Opportunities, newest first", body = Vec<OpportunityOverview>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn list_opportunities(
    State(db): State<DbState>,
    Query(query): Query<ListOpportunitiesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let opportunities = db
        .opportunity_repository
        .list_opportunities(query.search.as_deref())
        .await?;
    Ok(Json(opportunities))
}

/// Create an opportunity. Client and responsible may be referenced by id or
/// by name; unknown names are created on the fly.
#[utoipa::path(
    post,
    path = "/api/v1/opportunities",
    tag = "opportunities",
    request_body = CreateOpportunityRequest,
    responses(
        (status = 201, description = "Opportunity created", body = OpportunityOverview),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Referenced client or responsible not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, user, request), fields(actor = %user.actor()))]
pub async fn create_opportunity(
    State(db): State<DbState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateOpportunityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let opportunity = db
        .opportunity_repository
        .create_opportunity(&request, user.actor())
        .await?;

    tracing::info!(
        opportunity_id = opportunity.opportunity_id,
        client_id = opportunity.client.client_id,
        "Opportunity created"
    );
    Ok((StatusCode::CREATED, Json(opportunity)))
}

#[utoipa::path(
    get,
    path = "/api/v1/opportunities/{id}",
    tag = "opportunities",
    params(("id" = i32, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity with its inputs and artifacts", body = OpportunityDetail),
        (status = 404, description = "Opportunity not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db))]
pub async fn get_opportunity(
    State(db): State<DbState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let overview = db
        .opportunity_repository
        .get_overview(id)
        .await?
        .ok_or_else(|| opportunity_not_found(id))?;

    let inputs = db.input_repository.list_for_opportunity(id).await?;
    let artifacts = db.artifact_repository.list_for_opportunity(id).await?;

    Ok(Json(OpportunityDetail {
        overview,
        inputs,
        artifacts,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/opportunities/{id}",
    tag = "opportunities",
    params(("id" = i32, Path, description = "Opportunity ID")),
    request_body = UpdateOpportunityRequest,
    responses(
        (status = 200, description = "Opportunity updated", body = OpportunityOverview),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Opportunity not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, request))]
pub async fn update_opportunity(
    State(db): State<DbState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateOpportunityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let opportunity = db
        .opportunity_repository
        .update_opportunity(id, &request)
        .await?
        .ok_or_else(|| opportunity_not_found(id))?;
    Ok(Json(opportunity))
}

/// Delete an opportunity with its inputs and artifacts rows. Stored input
/// files are removed afterwards on a best-effort basis.
#[utoipa::path(
    delete,
    path = "/api/v1/opportunities/{id}",
    tag = "opportunities",
    params(("id" = i32, Path, description = "Opportunity ID")),
    responses(
        (status = 204, description = "Opportunity deleted"),
        (status = 404, description = "Opportunity not found", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip(db, files))]
pub async fn delete_opportunity(
    State(db): State<DbState>,
    State(files): State<FileState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpAppError> {
    let inputs = db.input_repository.list_for_opportunity(id).await?;

    if !db.opportunity_repository.delete_opportunity(id).await? {
        return Err(opportunity_not_found(id).into());
    }

    for input in &inputs {
        match files.storage.delete(INPUTS_BUCKET, &input.storage_path).await {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => tracing::warn!(
                error = %e,
                storage_path = %input.storage_path,
                "Failed to delete input file of removed opportunity"
            ),
        }
    }

    tracing::info!(opportunity_id = id, inputs_removed = inputs.len(), "Opportunity deleted");
    Ok(StatusCode::NO_CONTENT)
}
