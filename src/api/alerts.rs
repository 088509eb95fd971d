//! Alert API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, ApiJson, ApiQuery, ApiResult, ProximityQuery};
use crate::errors::AppError;
use crate::models::{Alert, CreateAlertRequest, MessageResponse, NearbyAlert, UpdateAlertRequest};
use crate::AppState;

/// Default search radius for alerts in an area, in meters.
pub const DEFAULT_ALERT_DISTANCE: f64 = 50_000.0;

/// GET /api/alerts - List all alerts, newest first.
pub async fn list_alerts(State(state): State<AppState>) -> ApiResult<Json<Vec<Alert>>> {
    Ok(Json(state.repo.list_alerts().await?))
}

/// GET /api/alerts/area - Active alerts near a point, nearest first.
pub async fn alerts_in_area(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProximityQuery>,
) -> ApiResult<Json<Vec<NearbyAlert>>> {
    let (center, max_distance) = query.resolve(DEFAULT_ALERT_DISTANCE)?;
    Ok(Json(state.repo.alerts_near(&center, max_distance).await?))
}

/// GET /api/alerts/:id - Get a single alert.
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Alert>> {
    state
        .repo
        .get_alert(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))
}

/// POST /api/alerts - Create a new alert.
pub async fn create_alert(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAlertRequest>,
) -> ApiResult<(StatusCode, Json<Alert>)> {
    let alert = request.validate()?;
    created(state.repo.create_alert(&alert).await?)
}

/// PUT /api/alerts/:id - Partially update an alert.
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateAlertRequest>,
) -> ApiResult<Json<Alert>> {
    let changes = request.validate()?;
    Ok(Json(state.repo.update_alert(&id, changes).await?))
}

/// DELETE /api/alerts/:id - Delete an alert.
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.repo.delete_alert(&id).await?;
    Ok(Json(MessageResponse::new("Alert deleted successfully")))
}
