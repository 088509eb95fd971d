//! Read-side aggregates for the dashboard.

use serde::Serialize;

use super::{AlertType, ResourceStatus, ResourceType};
use crate::geo::LatLng;

/// Per-type quantity totals.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TypeTotals {
    pub food: i64,
    pub shelter: i64,
    pub clothes: i64,
    pub medicine: i64,
}

impl TypeTotals {
    /// Saturates at `i64::MAX`.
    pub fn add(&mut self, resource_type: ResourceType, quantity: i64) {
        let slot = match resource_type {
            ResourceType::Food => &mut self.food,
            ResourceType::Shelter => &mut self.shelter,
            ResourceType::Clothes => &mut self.clothes,
            ResourceType::Medicine => &mut self.medicine,
        };
        *slot = slot.saturating_add(quantity);
    }

    /// Saturates at `i64::MAX`.
    pub fn total(&self) -> i64 {
        self.food
            .saturating_add(self.shelter)
            .saturating_add(self.clothes)
            .saturating_add(self.medicine)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampCounts {
    pub active: i64,
    pub closed: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceTotalsByType {
    /// Reserved for outbound distribution tracking; always zero today.
    pub distributed: TypeTotals,
    pub donated: TypeTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub by_type: ResourceTotalsByType,
    pub total_donated: i64,
}

/// `GET /api/dashboard/stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub camps: CampCounts,
    pub resources: ResourceSummary,
    pub active_alerts: i64,
}

/// One (day, type, status) bucket of the 7-day trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `YYYY-MM-DD`, UTC
    pub date: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub quantity: i64,
    pub status: ResourceStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAlert {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub location: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCamp {
    pub id: String,
    pub name: String,
    pub location: LatLng,
    pub created_at: String,
}

/// `GET /api/dashboard/recent-activities`
#[derive(Debug, Clone, Serialize)]
pub struct RecentActivities {
    pub resources: Vec<RecentResource>,
    pub alerts: Vec<RecentAlert>,
    pub camps: Vec<RecentCamp>,
}
