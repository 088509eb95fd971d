//! Camp store and camp proximity search.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::activities::append_activity;
use super::repository::enum_column;
use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::geo::{nearest_within, LatLng};
use crate::models::{
    ActivityType, Camp, CampName, CampStatus, NearbyCamp, NewActivity, NewCamp,
};

const CAMP_COLUMNS: &str = "id, name, capacity, lat, lng, status, created_at, last_updated";

impl Repository {
    /// List all camps, newest first.
    pub async fn list_camps(&self) -> Result<Vec<Camp>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMP_COLUMNS} FROM camps ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(camp_from_row).collect()
    }

    /// Get a camp by ID.
    pub async fn get_camp(&self, id: &str) -> Result<Option<Camp>, AppError> {
        let row = sqlx::query(&format!("SELECT {CAMP_COLUMNS} FROM camps WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(camp_from_row).transpose()
    }

    /// Names of all camps, for form population.
    pub async fn list_camp_names(&self) -> Result<Vec<CampName>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM camps ORDER BY name, created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<CampName, AppError> {
                Ok(CampName {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    /// Resolve a camp name (exact, case-sensitive) to the oldest camp carrying it.
    pub async fn resolve_camp(&self, name: &str) -> Result<CampName, AppError> {
        let mut conn = self.pool.acquire().await?;
        find_camp_by_name(&mut conn, name)
            .await?
            .ok_or_else(|| AppError::Reference("Selected camp does not exist".to_string()))
    }

    /// Create a new camp. New camps start active.
    pub async fn create_camp(&self, camp: &NewCamp) -> Result<Camp, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        let created = Camp {
            id,
            name: camp.name.clone(),
            capacity: camp.capacity,
            location: camp.location,
            status: CampStatus::Active,
            created_at: now.clone(),
            last_updated: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO camps (id, name, capacity, lat, lng, status, created_at, last_updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(created.capacity)
        .bind(created.location.lat)
        .bind(created.location.lng)
        .bind(created.status.as_str())
        .bind(&created.created_at)
        .bind(&created.last_updated)
        .execute(&mut *tx)
        .await?;

        append_activity(
            &mut *tx,
            &NewActivity::new(ActivityType::Camp, format!("New camp added: {}", created.name))
                .with_details(&created),
            self.activity_cap,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(camp_id = %created.id, name = %created.name, "Camp created");
        Ok(created)
    }

    /// Physically delete a camp, returning what was removed.
    pub async fn delete_camp(&self, id: &str) -> Result<Camp, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "DELETE FROM camps WHERE id = ? RETURNING {CAMP_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(AppError::NotFound("Camp not found".to_string()));
        };
        let deleted = camp_from_row(&row)?;

        append_activity(
            &mut *tx,
            &NewActivity::new(ActivityType::Camp, format!("Camp deleted: {}", deleted.name)),
            self.activity_cap,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(camp_id = %deleted.id, name = %deleted.name, "Camp deleted");
        Ok(deleted)
    }

    /// Active camps within `max_distance` meters of `center`, nearest first.
    pub async fn camps_near(
        &self,
        center: &LatLng,
        max_distance: f64,
    ) -> Result<Vec<NearbyCamp>, AppError> {
        let (min_lat, max_lat) = center.latitude_band(max_distance);

        let rows = sqlx::query(&format!(
            "SELECT {CAMP_COLUMNS} FROM camps WHERE status = ? AND lat BETWEEN ? AND ?"
        ))
        .bind(CampStatus::Active.as_str())
        .bind(min_lat)
        .bind(max_lat)
        .fetch_all(&self.pool)
        .await?;

        let camps = rows
            .iter()
            .map(camp_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nearest_within(camps, center, max_distance, |c| c.location)
            .into_iter()
            .map(|(camp, distance)| NearbyCamp { camp, distance })
            .collect())
    }
}

async fn find_camp_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<CampName>, AppError> {
    let row = sqlx::query(
        "SELECT id, name FROM camps WHERE name = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|row| -> Result<CampName, AppError> {
        Ok(CampName {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    })
    .transpose()
}

pub(super) fn camp_from_row(row: &SqliteRow) -> Result<Camp, AppError> {
    Ok(Camp {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        capacity: row.try_get("capacity")?,
        location: LatLng::new(row.try_get("lat")?, row.try_get("lng")?),
        status: enum_column(row, "status", CampStatus::from_str)?,
        created_at: row.try_get("created_at")?,
        last_updated: row.try_get("last_updated")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{camp_request, repo};
    use crate::errors::AppError;
    use crate::geo::LatLng;
    use crate::models::CampStatus;

    #[tokio::test]
    async fn test_create_then_get_returns_identical_fields() {
        let (repo, _dir) = repo().await;
        let new_camp = camp_request("Central Relief Camp", 12.9716, 77.5946)
            .validate()
            .unwrap();

        let created = repo.create_camp(&new_camp).await.unwrap();
        let fetched = repo.get_camp(&created.id).await.unwrap().unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.status, CampStatus::Active);
        assert_eq!(fetched.capacity, 250);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (repo, _dir) = repo().await;
        for name in ["First", "Second", "Third"] {
            let camp = camp_request(name, 10.0, 10.0).validate().unwrap();
            repo.create_camp(&camp).await.unwrap();
        }

        let names: Vec<_> = repo
            .list_camps()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_delete_missing_camp_is_not_found() {
        let (repo, _dir) = repo().await;
        let camp = camp_request("Keep Me", 10.0, 10.0).validate().unwrap();
        repo.create_camp(&camp).await.unwrap();

        let err = repo.delete_camp("does-not-exist").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repo.list_camps().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_name_resolution_is_case_sensitive() {
        let (repo, _dir) = repo().await;
        let camp = camp_request("Central Relief Camp", 10.0, 10.0)
            .validate()
            .unwrap();
        let created = repo.create_camp(&camp).await.unwrap();

        let found = repo.resolve_camp("Central Relief Camp").await.unwrap();
        assert_eq!(found.id, created.id);

        let err = repo.resolve_camp("central relief camp").await.unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));
    }

    #[tokio::test]
    async fn test_camps_near_orders_by_distance() {
        let (repo, _dir) = repo().await;
        for (name, lat) in [("Far", 0.5), ("Near", 0.05), ("Mid", 0.2)] {
            let camp = camp_request(name, lat, 0.0).validate().unwrap();
            repo.create_camp(&camp).await.unwrap();
        }

        let hits = repo
            .camps_near(&LatLng::new(0.0, 0.0), 30_000.0)
            .await
            .unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.camp.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Mid"]);
        assert!(hits[0].distance < hits[1].distance);
    }
}
