//! Camp API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, ApiJson, ApiQuery, ApiResult, ProximityQuery};
use crate::errors::AppError;
use crate::models::{Camp, CreateCampRequest, MessageResponse, NearbyCamp};
use crate::AppState;

/// Default search radius for nearby camps, in meters.
pub const DEFAULT_CAMP_DISTANCE: f64 = 10_000.0;

/// GET /api/camps - List all camps, newest first.
pub async fn list_camps(State(state): State<AppState>) -> ApiResult<Json<Vec<Camp>>> {
    Ok(Json(state.repo.list_camps().await?))
}

/// GET /api/camps/nearby - Active camps near a point, nearest first.
pub async fn nearby_camps(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProximityQuery>,
) -> ApiResult<Json<Vec<NearbyCamp>>> {
    let (center, max_distance) = query.resolve(DEFAULT_CAMP_DISTANCE)?;
    Ok(Json(state.repo.camps_near(&center, max_distance).await?))
}

/// GET /api/camps/:id - Get a single camp.
pub async fn get_camp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Camp>> {
    state
        .repo
        .get_camp(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Camp not found".to_string()))
}

/// POST /api/camps - Create a new camp.
pub async fn create_camp(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCampRequest>,
) -> ApiResult<(StatusCode, Json<Camp>)> {
    let camp = request.validate()?;
    created(state.repo.create_camp(&camp).await?)
}

/// DELETE /api/camps/:id - Delete a camp.
pub async fn delete_camp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.repo.delete_camp(&id).await?;
    Ok(Json(MessageResponse::new("Camp deleted successfully")))
}
