//! Operator accounts.
//!
//! Credentials are stored and compared in plaintext; this only gates the
//! admin views of the frontend.

use serde::{Deserialize, Serialize};

use super::required_text;
use crate::errors::AppError;

/// Account as listed to clients; the password never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Username and password, both present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(self) -> Result<Credentials, AppError> {
        let username = required_text(&self.username);
        let password = self.password.filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(AppError::validation("Username and password are required")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}
