//! Activity feed storage.
//!
//! Entries are appended inside the same transaction as the write they
//! describe, and the feed is trimmed to the configured cap on every append.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::repository::enum_column;
use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::models::{Activity, ActivityType, NewActivity};

impl Repository {
    /// Newest-first feed, at most `limit` entries (clamped to the cap).
    pub async fn list_activities(&self, limit: Option<i64>) -> Result<Vec<Activity>, AppError> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(self.activity_cap)
            .min(self.activity_cap);

        let rows = sqlx::query(
            "SELECT id, message, activity_type, timestamp, details FROM activities ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(activity_from_row).collect()
    }

    /// Append a standalone entry.
    pub async fn add_activity(&self, activity: &NewActivity) -> Result<Activity, AppError> {
        let mut tx = self.pool.begin().await?;
        let stored = append_activity(&mut *tx, activity, self.activity_cap).await?;
        tx.commit().await?;
        Ok(stored)
    }
}

/// Insert an entry and evict everything beyond the newest `cap`.
pub(super) async fn append_activity(
    conn: &mut SqliteConnection,
    activity: &NewActivity,
    cap: i64,
) -> Result<Activity, AppError> {
    let now = now_timestamp();
    let details_json = activity
        .details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let result = sqlx::query(
        "INSERT INTO activities (message, activity_type, timestamp, details) VALUES (?, ?, ?, ?)",
    )
    .bind(&activity.message)
    .bind(activity.activity_type.as_str())
    .bind(&now)
    .bind(&details_json)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "DELETE FROM activities WHERE id NOT IN (SELECT id FROM activities ORDER BY id DESC LIMIT ?)",
    )
    .bind(cap)
    .execute(&mut *conn)
    .await?;

    Ok(Activity {
        id: result.last_insert_rowid(),
        message: activity.message.clone(),
        activity_type: activity.activity_type,
        timestamp: now,
        details: activity.details.clone(),
    })
}

fn activity_from_row(row: &SqliteRow) -> Result<Activity, AppError> {
    let id: i64 = row.try_get("id")?;
    let details: Option<String> = row.try_get("details")?;
    let details = details.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(activity_id = id, "Malformed activity details: {}", e);
            None
        }
    });
    Ok(Activity {
        id,
        message: row.try_get("message")?,
        activity_type: enum_column(row, "activity_type", ActivityType::from_str)?,
        timestamp: row.try_get("timestamp")?,
        details,
    })
}

#[cfg(test)]
mod tests {
    use crate::db::test_support;
    use crate::models::{ActivityType, NewActivity};

    #[tokio::test]
    async fn test_feed_is_newest_first_and_capped() {
        let (repo, _dir) = test_support::repo_with_cap(3).await;

        for i in 0..5 {
            repo.add_activity(&NewActivity::new(ActivityType::Info, format!("entry {i}")))
                .await
                .unwrap();
        }

        let feed = repo.list_activities(None).await.unwrap();
        let messages: Vec<_> = feed.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 4", "entry 3", "entry 2"]);
    }

    #[tokio::test]
    async fn test_limit_is_clamped_to_cap() {
        let (repo, _dir) = test_support::repo_with_cap(2).await;
        for _ in 0..4 {
            repo.add_activity(&NewActivity::new(ActivityType::Info, "tick"))
                .await
                .unwrap();
        }

        assert_eq!(repo.list_activities(Some(10)).await.unwrap().len(), 2);
        assert_eq!(repo.list_activities(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_details_round_trip() {
        let (repo, _dir) = test_support::repo().await;
        let entry = NewActivity::new(ActivityType::Camp, "New camp added: North")
            .with_details(&serde_json::json!({ "capacity": 120 }));
        repo.add_activity(&entry).await.unwrap();

        let feed = repo.list_activities(None).await.unwrap();
        assert_eq!(feed[0].details.as_ref().unwrap()["capacity"], 120);
        assert_eq!(feed[0].activity_type, ActivityType::Camp);
    }

    #[tokio::test]
    async fn test_malformed_details_do_not_hide_the_entry() {
        let (repo, _dir) = test_support::repo().await;
        let stored = repo
            .add_activity(&NewActivity::new(ActivityType::Info, "Generator refuelled"))
            .await
            .unwrap();

        sqlx::query("UPDATE activities SET details = ? WHERE id = ?")
            .bind("{not json")
            .bind(stored.id)
            .execute(&repo.pool)
            .await
            .unwrap();

        let feed = repo.list_activities(None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].message, "Generator refuelled");
        assert!(feed[0].details.is_none());
    }
}
