//! Dashboard endpoints.

use axum::{extract::State, Json};

use super::ApiResult;
use crate::models::{DashboardStats, RecentActivities, TrendPoint};
use crate::AppState;

/// GET /api/dashboard/stats
pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.repo.dashboard_stats().await?))
}

/// GET /api/dashboard/trends
pub async fn dashboard_trends(State(state): State<AppState>) -> ApiResult<Json<Vec<TrendPoint>>> {
    Ok(Json(state.repo.resource_trends().await?))
}

/// GET /api/dashboard/recent-activities
pub async fn recent_activities(
    State(state): State<AppState>,
) -> ApiResult<Json<RecentActivities>> {
    Ok(Json(state.repo.recent_activities().await?))
}
