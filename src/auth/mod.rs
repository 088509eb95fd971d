//! Admin gate and operator login.
//!
//! Admin writes (camps, alerts) sit behind an optional pre-shared key.
//! Operator login is a plaintext credential lookup; it is not a security
//! boundary. All comparisons are constant-time.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Credentials, LoginUser};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Accounts that exist without registration.
pub const BUILTIN_ACCOUNTS: [(&str, &str); 2] = [("admin", "admin123"), ("manager", "manager123")];

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            // Also accept the key as a bearer token
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.to_string());

    match provided {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid API key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing API key".to_string()).into_response(),
    }
}

/// Check credentials against registered accounts, then the built-in ones.
pub async fn verify_login(
    repo: &Repository,
    credentials: &Credentials,
) -> Result<LoginUser, AppError> {
    if let Some((user, stored)) = repo.find_user_with_password(&credentials.username).await? {
        if constant_time_compare(&credentials.password, &stored) {
            return Ok(LoginUser {
                id: Some(user.id),
                username: user.username,
            });
        }
    }

    let builtin = BUILTIN_ACCOUNTS.iter().any(|(username, password)| {
        constant_time_compare(&credentials.username, username)
            && constant_time_compare(&credentials.password, password)
    });
    if builtin {
        return Ok(LoginUser {
            id: None,
            username: credentials.username.clone(),
        });
    }

    tracing::warn!(username = %credentials.username, "Rejected login");
    Err(AppError::Unauthorized(
        "Invalid username or password".to_string(),
    ))
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
