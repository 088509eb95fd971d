//! Account storage for the plaintext login flow.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::activities::append_activity;
use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::models::{ActivityType, Credentials, NewActivity, User};

impl Repository {
    /// Register an account; usernames are unique.
    pub async fn create_user(&self, credentials: &Credentials) -> Result<User, AppError> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: credentials.username.clone(),
            created_at: now_timestamp(),
        };

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (id, username, password, created_at) VALUES (?, ?, ?, ?) ON CONFLICT(username) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&credentials.password)
        .bind(&user.created_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::validation("Username already exists"));
        }

        append_activity(
            &mut *tx,
            &NewActivity::new(
                ActivityType::User,
                format!("User registered: {}", user.username),
            ),
            self.activity_cap,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Look up an account together with its stored password.
    pub async fn find_user_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<(User, String), AppError> {
            Ok((user_from_row(&row)?, row.try_get("password")?))
        })
        .transpose()
    }

    /// All accounts, passwords omitted.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query("SELECT id, username, created_at FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, AppError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        created_at: row.try_get("created_at")?,
    })
}
