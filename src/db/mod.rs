//! Database module for SQLite persistence.
//!
//! SQLite is the single source of truth for camps, alerts, resource records,
//! the activity feed and accounts.

mod activities;
mod alerts;
mod camps;
mod dashboard;
mod repository;
mod resources;
mod users;

pub use repository::*;
pub(crate) use resources::{resource_from_row, RESOURCE_COLUMNS};

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Current time as a fixed-width RFC 3339 UTC string.
///
/// Fixed microsecond precision keeps lexical order equal to time order,
/// which every `ORDER BY created_at` relies on.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS camps (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity > 0),
            lat REAL NOT NULL CHECK (lat BETWEEN -90 AND 90),
            lng REAL NOT NULL CHECK (lng BETWEEN -180 AND 180),
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            last_updated TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            alert_type TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT NOT NULL,
            longitude REAL NOT NULL CHECK (longitude BETWEEN -180 AND 180),
            latitude REAL NOT NULL CHECK (latitude BETWEEN -90 AND 90),
            affected_radius REAL NOT NULL CHECK (affected_radius > 0 AND affected_radius <= 1000),
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            last_updated TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // camp_id is resolved from camp_name at write time; no FOREIGN KEY so a
    // deleted camp leaves its history readable through the name snapshot.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            contact_number TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            priority TEXT NOT NULL,
            camp_id TEXT NOT NULL,
            camp_name TEXT NOT NULL,
            can_deliver_to_camp INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            fulfilled_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            resource_type TEXT PRIMARY KEY,
            quantity INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            activity_type TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            details TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_camps_name ON camps(name, created_at);
        CREATE INDEX IF NOT EXISTS idx_camps_created_at ON camps(created_at);
        CREATE INDEX IF NOT EXISTS idx_camps_status_lat ON camps(status, lat);
        CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts(created_at);
        CREATE INDEX IF NOT EXISTS idx_alerts_status_lat ON alerts(status, latitude);
        CREATE INDEX IF NOT EXISTS idx_resources_created_at ON resources(created_at);
        CREATE INDEX IF NOT EXISTS idx_resources_pending
            ON resources(status, priority, resource_type, camp_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::{init_database, Repository};
    use crate::models::{
        CampName, CreateCampRequest, LocationInput, Priority, ResourceStatus, ResourceType,
    };

    /// Repository over a throwaway database; keep the `TempDir` alive.
    pub async fn repo() -> (Arc<Repository>, TempDir) {
        repo_with_cap(50).await
    }

    pub async fn repo_with_cap(cap: i64) -> (Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Arc::new(Repository::new(pool, cap)), temp_dir)
    }

    pub fn camp_request(name: &str, lat: f64, lng: f64) -> CreateCampRequest {
        CreateCampRequest {
            name: Some(name.to_string()),
            capacity: Some(250),
            location: Some(LocationInput {
                lat: Some(lat),
                lng: Some(lng),
            }),
        }
    }

    /// Insert a pending high-priority request with a fixed id and timestamp.
    pub async fn insert_pending_request(
        repo: &Repository,
        id: &str,
        created_at: &str,
        resource_type: ResourceType,
        camp: &CampName,
    ) {
        sqlx::query(
            "INSERT INTO resources (id, name, contact_number, resource_type, quantity, priority, camp_id, camp_name, can_deliver_to_camp, status, created_at) VALUES (?, 'Ravi', '1234567890', ?, 10, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id)
        .bind(resource_type.as_str())
        .bind(Priority::High.as_str())
        .bind(&camp.id)
        .bind(&camp.name)
        .bind(ResourceStatus::Requested.as_str())
        .bind(created_at)
        .execute(&repo.pool)
        .await
        .expect("Failed to insert request");
    }
}
