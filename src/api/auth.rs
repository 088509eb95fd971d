//! Account endpoints.

use axum::{extract::State, http::StatusCode, Json};

use super::{created, ApiJson, ApiResult};
use crate::auth::verify_login;
use crate::models::{
    ActivityType, CredentialsRequest, LoginResponse, MessageResponse, NewActivity, User,
};
use crate::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let credentials = request.validate()?;
    state.repo.create_user(&credentials).await?;
    created(MessageResponse::new("User registered successfully"))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let credentials = request.validate()?;
    let user = verify_login(&state.repo, &credentials).await?;

    let entry = NewActivity::new(ActivityType::User, format!("User logged in: {}", user.username));
    if let Err(e) = state.repo.add_activity(&entry).await {
        tracing::warn!("Failed to record login activity: {}", e);
    }

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

/// GET /api/auth/users - Accounts without passwords.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.repo.list_users().await?))
}
