//! Alert store and alert proximity search.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::activities::append_activity;
use super::repository::enum_column;
use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::geo::{nearest_within, GeoPoint, LatLng};
use crate::models::{
    ActivityType, Alert, AlertChanges, AlertStatus, AlertType, NearbyAlert, NewActivity, NewAlert,
};

const ALERT_COLUMNS: &str = "id, title, alert_type, description, location, longitude, latitude, affected_radius, status, created_at, last_updated";

impl Repository {
    /// List all alerts, newest first.
    pub async fn list_alerts(&self) -> Result<Vec<Alert>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    /// Get an alert by ID.
    pub async fn get_alert(&self, id: &str) -> Result<Option<Alert>, AppError> {
        let row = sqlx::query(&format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(alert_from_row).transpose()
    }

    /// Create a new alert. New alerts start active.
    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, AppError> {
        let now = now_timestamp();
        let created = Alert {
            id: uuid::Uuid::new_v4().to_string(),
            title: alert.title.clone(),
            alert_type: alert.alert_type,
            description: alert.description.clone(),
            location: alert.location.clone(),
            coordinates: alert.coordinates.clone(),
            affected_radius: alert.affected_radius,
            status: AlertStatus::Active,
            created_at: now.clone(),
            last_updated: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO alerts (id, title, alert_type, description, location, longitude, latitude, affected_radius, status, created_at, last_updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created.id)
        .bind(&created.title)
        .bind(created.alert_type.as_str())
        .bind(&created.description)
        .bind(&created.location)
        .bind(created.coordinates.longitude())
        .bind(created.coordinates.latitude())
        .bind(created.affected_radius)
        .bind(created.status.as_str())
        .bind(&created.created_at)
        .bind(&created.last_updated)
        .execute(&mut *tx)
        .await?;

        append_activity(
            &mut *tx,
            &NewActivity::new(
                ActivityType::Alert,
                format!(
                    "New emergency alert: {} ({})",
                    created.title,
                    created.alert_type.as_str()
                ),
            )
            .with_details(&created),
            self.activity_cap,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(alert_id = %created.id, alert_type = created.alert_type.as_str(), "Alert created");
        Ok(created)
    }

    /// Apply a partial update and refresh `lastUpdated`.
    pub async fn update_alert(&self, id: &str, changes: AlertChanges) -> Result<Alert, AppError> {
        let mut alert = self
            .get_alert(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))?;

        changes.apply(&mut alert);
        alert.last_updated = now_timestamp();

        let result = sqlx::query(
            "UPDATE alerts SET title = ?, alert_type = ?, description = ?, location = ?, longitude = ?, latitude = ?, affected_radius = ?, status = ?, last_updated = ? WHERE id = ?",
        )
        .bind(&alert.title)
        .bind(alert.alert_type.as_str())
        .bind(&alert.description)
        .bind(&alert.location)
        .bind(alert.coordinates.longitude())
        .bind(alert.coordinates.latitude())
        .bind(alert.affected_radius)
        .bind(alert.status.as_str())
        .bind(&alert.last_updated)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Alert not found".to_string()));
        }

        tracing::info!(alert_id = %id, status = alert.status.as_str(), "Alert updated");
        Ok(alert)
    }

    /// Physically delete an alert, returning what was removed.
    pub async fn delete_alert(&self, id: &str) -> Result<Alert, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "DELETE FROM alerts WHERE id = ? RETURNING {ALERT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(AppError::NotFound("Alert not found".to_string()));
        };
        let deleted = alert_from_row(&row)?;

        append_activity(
            &mut *tx,
            &NewActivity::new(
                ActivityType::Alert,
                format!("Alert dismissed: {}", deleted.title),
            ),
            self.activity_cap,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(alert_id = %deleted.id, "Alert deleted");
        Ok(deleted)
    }

    /// Active alerts within `max_distance` meters of `center`, nearest first.
    pub async fn alerts_near(
        &self,
        center: &LatLng,
        max_distance: f64,
    ) -> Result<Vec<NearbyAlert>, AppError> {
        let (min_lat, max_lat) = center.latitude_band(max_distance);

        let rows = sqlx::query(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE status = ? AND latitude BETWEEN ? AND ?"
        ))
        .bind(AlertStatus::Active.as_str())
        .bind(min_lat)
        .bind(max_lat)
        .fetch_all(&self.pool)
        .await?;

        let alerts = rows
            .iter()
            .map(alert_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(
            nearest_within(alerts, center, max_distance, |a| a.coordinates.to_lat_lng())
                .into_iter()
                .map(|(alert, distance)| NearbyAlert { alert, distance })
                .collect(),
        )
    }
}

pub(super) fn alert_from_row(row: &SqliteRow) -> Result<Alert, AppError> {
    Ok(Alert {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        alert_type: enum_column(row, "alert_type", AlertType::from_str)?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        coordinates: GeoPoint::new(row.try_get("longitude")?, row.try_get("latitude")?),
        affected_radius: row.try_get("affected_radius")?,
        status: enum_column(row, "status", AlertStatus::from_str)?,
        created_at: row.try_get("created_at")?,
        last_updated: row.try_get("last_updated")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::repo;
    use crate::errors::AppError;
    use crate::geo::{CoordinatesInput, LatLng};
    use crate::models::{AlertStatus, CreateAlertRequest, NewAlert, UpdateAlertRequest};

    fn alert_at(title: &str, lat: f64, lng: f64) -> NewAlert {
        CreateAlertRequest {
            title: Some(title.to_string()),
            alert_type: Some("flood".to_string()),
            description: Some("Rising water".to_string()),
            location: Some("Riverside".to_string()),
            coordinates: Some(CoordinatesInput::Pair(vec![lng, lat])),
            affected_radius: Some(25.0),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_proximity_respects_max_distance() {
        let (repo, _dir) = repo().await;
        // ~60 km north of the query point
        let alert = repo
            .create_alert(&alert_at("Dam breach", 0.539, 0.0))
            .await
            .unwrap();

        let origin = LatLng::new(0.0, 0.0);
        assert!(repo.alerts_near(&origin, 50_000.0).await.unwrap().is_empty());

        let hits = repo.alerts_near(&origin, 70_000.0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].alert.id, alert.id);
        assert!((hits[0].distance - 60_000.0).abs() < 500.0);
    }

    #[tokio::test]
    async fn test_proximity_skips_resolved_alerts() {
        let (repo, _dir) = repo().await;
        let near = repo.create_alert(&alert_at("Near", 0.01, 0.0)).await.unwrap();
        repo.create_alert(&alert_at("Nearer", 0.005, 0.0))
            .await
            .unwrap();

        let resolve = UpdateAlertRequest {
            status: Some("resolved".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        repo.update_alert(&near.id, resolve).await.unwrap();

        let hits = repo
            .alerts_near(&LatLng::new(0.0, 0.0), 50_000.0)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].alert.title, "Nearer");
    }

    #[tokio::test]
    async fn test_update_persists_and_refreshes_timestamp() {
        let (repo, _dir) = repo().await;
        let created = repo.create_alert(&alert_at("Fire", 1.0, 1.0)).await.unwrap();

        let changes = UpdateAlertRequest {
            affected_radius: Some(1000.0),
            status: Some("resolved".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let updated = repo.update_alert(&created.id, changes).await.unwrap();

        let fetched = repo.get_alert(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(fetched.status, AlertStatus::Resolved);
        assert_eq!(fetched.affected_radius, 1000.0);
        assert!(fetched.last_updated >= created.last_updated);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let (repo, _dir) = repo().await;
        let err = repo
            .update_alert("missing", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = repo.delete_alert("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
