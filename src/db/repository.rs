//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Operations
//! are split by entity across the sibling modules; each adds an `impl
//! Repository` block.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
    /// Activity feed entries kept before eviction
    pub(super) activity_cap: i64,
}

impl Repository {
    pub fn new(pool: SqlitePool, activity_cap: i64) -> Self {
        Self { pool, activity_cap }
    }

    /// Check the database answers.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Read a TEXT column holding an enum value.
pub(super) fn enum_column<T>(
    row: &SqliteRow,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, AppError> {
    let raw: String = row.try_get(column)?;
    parse(&raw).ok_or_else(|| {
        AppError::Internal(format!("Unexpected value '{}' in column {}", raw, column))
    })
}
