//! Dashboard aggregation.
//!
//! Always computed from current table contents; nothing is cached.

use chrono::{Duration, SecondsFormat, Utc};
use sqlx::Row;

use super::repository::enum_column;
use super::Repository;
use crate::errors::AppError;
use crate::geo::LatLng;
use crate::models::{
    AlertStatus, AlertType, CampCounts, CampStatus, DashboardStats, RecentActivities,
    RecentAlert, RecentCamp, RecentResource, ResourceStatus, ResourceSummary,
    ResourceTotalsByType, ResourceType, TrendPoint, TypeTotals,
};

/// Days covered by the trend series.
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Entries per entity type in the recent-activity view.
pub const RECENT_LIMIT: i64 = 5;

impl Repository {
    /// Camp counts, donated totals by type and the active alert count.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let camp_rows = sqlx::query("SELECT status, COUNT(*) AS n FROM camps GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut camps = CampCounts {
            active: 0,
            closed: 0,
            total: 0,
        };
        for row in &camp_rows {
            let n: i64 = row.try_get("n")?;
            match enum_column(row, "status", CampStatus::from_str)? {
                CampStatus::Active => camps.active += n,
                CampStatus::Closed => camps.closed += n,
            }
            camps.total += n;
        }

        let donated_rows = sqlx::query(
            "SELECT resource_type, SUM(quantity) AS total FROM resources WHERE status = ? GROUP BY resource_type",
        )
        .bind(ResourceStatus::Donated.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut donated = TypeTotals::default();
        for row in &donated_rows {
            let resource_type = enum_column(row, "resource_type", ResourceType::from_str)?;
            donated.add(resource_type, row.try_get("total")?);
        }

        let active_alerts: i64 = sqlx::query("SELECT COUNT(*) AS n FROM alerts WHERE status = ?")
            .bind(AlertStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;

        Ok(DashboardStats {
            camps,
            resources: ResourceSummary {
                by_type: ResourceTotalsByType {
                    distributed: TypeTotals::default(),
                    donated,
                },
                total_donated: donated.total(),
            },
            active_alerts,
        })
    }

    /// Quantity per (day, type, status) over the last seven days, oldest day first.
    pub async fn resource_trends(&self) -> Result<Vec<TrendPoint>, AppError> {
        let since = (Utc::now() - Duration::days(TREND_WINDOW_DAYS))
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        let rows = sqlx::query(
            r#"
            SELECT substr(created_at, 1, 10) AS day, resource_type, status, SUM(quantity) AS total
            FROM resources
            WHERE created_at >= ?
            GROUP BY day, resource_type, status
            ORDER BY day ASC, resource_type ASC, status ASC
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<TrendPoint, AppError> {
                Ok(TrendPoint {
                    date: row.try_get("day")?,
                    resource_type: enum_column(row, "resource_type", ResourceType::from_str)?,
                    status: enum_column(row, "status", ResourceStatus::from_str)?,
                    total_quantity: row.try_get("total")?,
                })
            })
            .collect()
    }

    /// The five newest resources, alerts and camps.
    pub async fn recent_activities(&self) -> Result<RecentActivities, AppError> {
        let (resources, alerts, camps) = tokio::try_join!(
            self.recent_resources(),
            self.recent_alerts(),
            self.recent_camps()
        )?;

        Ok(RecentActivities {
            resources,
            alerts,
            camps,
        })
    }

    async fn recent_resources(&self) -> Result<Vec<RecentResource>, AppError> {
        let rows = sqlx::query(
            "SELECT id, resource_type, quantity, status, created_at FROM resources ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<RecentResource, AppError> {
                Ok(RecentResource {
                    id: row.try_get("id")?,
                    resource_type: enum_column(row, "resource_type", ResourceType::from_str)?,
                    quantity: row.try_get("quantity")?,
                    status: enum_column(row, "status", ResourceStatus::from_str)?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn recent_alerts(&self) -> Result<Vec<RecentAlert>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, alert_type, location, created_at FROM alerts ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<RecentAlert, AppError> {
                Ok(RecentAlert {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    alert_type: enum_column(row, "alert_type", AlertType::from_str)?,
                    location: row.try_get("location")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn recent_camps(&self) -> Result<Vec<RecentCamp>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, lat, lng, created_at FROM camps ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<RecentCamp, AppError> {
                Ok(RecentCamp {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    location: LatLng::new(row.try_get("lat")?, row.try_get("lng")?),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
