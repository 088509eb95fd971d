//! Resource request/donation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{CampName, CreateResourceRequest, ResourceKind, ResourceRecord, TypeTotals};
use crate::AppState;

/// GET /api/resources - List all requests and donations, newest first.
pub async fn list_resources(State(state): State<AppState>) -> ApiResult<Json<Vec<ResourceRecord>>> {
    Ok(Json(state.repo.list_resources().await?))
}

/// GET /api/resources/:id - Get a single record.
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResourceRecord>> {
    state
        .repo
        .get_resource(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))
}

/// GET /api/resources/camps - Camp names for the request/donate forms.
pub async fn list_resource_camps(State(state): State<AppState>) -> ApiResult<Json<Vec<CampName>>> {
    Ok(Json(state.repo.list_camp_names().await?))
}

/// GET /api/resources/inventory - Running donated totals.
pub async fn get_inventory(State(state): State<AppState>) -> ApiResult<Json<TypeTotals>> {
    Ok(Json(state.repo.inventory().await?))
}

/// POST /api/resources/request - Request a resource.
pub async fn request_resource(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<ResourceRecord>)> {
    let resource = request.validate(ResourceKind::Request)?;
    created(state.repo.create_request(&resource).await?)
}

/// POST /api/resources/donate - Donate a resource.
///
/// May fulfil a pending high-priority request as a side effect; the body is
/// the donation either way.
pub async fn donate_resource(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<ResourceRecord>)> {
    let resource = request.validate(ResourceKind::Donation)?;
    let outcome = state.repo.create_donation(&resource).await?;
    if let Some(request) = &outcome.fulfilled {
        tracing::info!(
            request_id = %request.id,
            donation_id = %outcome.donation.id,
            "High priority request fulfilled by donation"
        );
    }
    created(outcome.donation)
}
