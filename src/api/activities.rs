//! Activity feed endpoints.

use axum::{extract::State, http::StatusCode, Json};

use super::{created, ApiJson, ApiQuery, ApiResult};
use crate::models::{Activity, ActivityQuery, CreateActivityRequest};
use crate::AppState;

/// GET /api/activities - Newest-first feed.
pub async fn list_activities(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<Json<Vec<Activity>>> {
    Ok(Json(state.repo.list_activities(query.limit).await?))
}

/// POST /api/activities - Append a client-originated entry.
pub async fn create_activity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateActivityRequest>,
) -> ApiResult<(StatusCode, Json<Activity>)> {
    let activity = request.validate()?;
    created(state.repo.add_activity(&activity).await?)
}
