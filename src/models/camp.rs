//! Relief camp model.

use serde::{Deserialize, Serialize};

use super::required_text;
use crate::errors::AppError;
use crate::geo::LatLng;

/// Whether a camp is currently taking people in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampStatus {
    Active,
    Closed,
}

impl CampStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampStatus::Active => "active",
            CampStatus::Closed => "closed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CampStatus::Active),
            "closed" => Some(CampStatus::Closed),
            _ => None,
        }
    }
}

/// A relief camp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Camp {
    pub id: String,
    pub name: String,
    pub capacity: i64,
    pub location: LatLng,
    pub status: CampStatus,
    pub created_at: String,
    pub last_updated: String,
}

/// Camp returned by a proximity query, with its distance from the query point.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyCamp {
    #[serde(flatten)]
    pub camp: Camp,
    /// Meters
    pub distance: f64,
}

/// Camp name lookup entry used to populate resource forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampName {
    pub id: String,
    pub name: String,
}

/// Location as posted by the camp form; both halves are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationInput {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Request body for creating a camp.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub location: Option<LocationInput>,
}

/// A camp that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCamp {
    pub name: String,
    pub capacity: i64,
    pub location: LatLng,
}

impl CreateCampRequest {
    pub fn validate(&self) -> Result<NewCamp, AppError> {
        let name = required_text(&self.name);
        let location = self
            .location
            .as_ref()
            .and_then(|loc| Some(LatLng::new(loc.lat?, loc.lng?)));

        let (Some(name), Some(capacity), Some(location)) = (name, self.capacity, location) else {
            return Err(AppError::validation("Missing required fields"));
        };

        if capacity <= 0 {
            return Err(AppError::validation("Capacity must be greater than 0"));
        }

        location.validate().map_err(AppError::Validation)?;

        Ok(NewCamp {
            name,
            capacity,
            location,
        })
    }
}
