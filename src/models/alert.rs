//! Emergency alert model.

use serde::{Deserialize, Serialize};

use super::required_text;
use crate::errors::AppError;
use crate::geo::{CoordinatesInput, GeoPoint};

/// Largest affected radius an alert may declare, in kilometers.
pub const MAX_AFFECTED_RADIUS_KM: f64 = 1000.0;

/// Kind of hazard an alert reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Flood,
    Earthquake,
    Hurricane,
    Fire,
    Landslide,
    Other,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Flood => "flood",
            AlertType::Earthquake => "earthquake",
            AlertType::Hurricane => "hurricane",
            AlertType::Fire => "fire",
            AlertType::Landslide => "landslide",
            AlertType::Other => "other",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "flood" => Some(AlertType::Flood),
            "earthquake" => Some(AlertType::Earthquake),
            "hurricane" => Some(AlertType::Hurricane),
            "fire" => Some(AlertType::Fire),
            "landslide" => Some(AlertType::Landslide),
            "other" => Some(AlertType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AlertStatus::Active),
            "resolved" => Some(AlertStatus::Resolved),
            _ => None,
        }
    }
}

/// An emergency alert pinned to a point with an affected radius.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub description: String,
    /// Free-text place label
    pub location: String,
    pub coordinates: GeoPoint,
    /// Kilometers
    pub affected_radius: f64,
    pub status: AlertStatus,
    pub created_at: String,
    pub last_updated: String,
}

/// Alert returned by a proximity query, with its distance from the query point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyAlert {
    #[serde(flatten)]
    pub alert: Alert,
    /// Meters
    pub distance: f64,
}

/// Request body for creating an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesInput>,
    #[serde(default)]
    pub affected_radius: Option<f64>,
}

/// Request body for a partial alert update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesInput>,
    #[serde(default)]
    pub affected_radius: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Validated alert ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub title: String,
    pub alert_type: AlertType,
    pub description: String,
    pub location: String,
    pub coordinates: GeoPoint,
    pub affected_radius: f64,
}

/// Validated set of changes; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertChanges {
    pub title: Option<String>,
    pub alert_type: Option<AlertType>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub affected_radius: Option<f64>,
    pub status: Option<AlertStatus>,
}

impl AlertChanges {
    /// Apply the changes on top of an existing alert.
    pub fn apply(self, alert: &mut Alert) {
        if let Some(title) = self.title {
            alert.title = title;
        }
        if let Some(alert_type) = self.alert_type {
            alert.alert_type = alert_type;
        }
        if let Some(description) = self.description {
            alert.description = description;
        }
        if let Some(location) = self.location {
            alert.location = location;
        }
        if let Some(coordinates) = self.coordinates {
            alert.coordinates = coordinates;
        }
        if let Some(radius) = self.affected_radius {
            alert.affected_radius = radius;
        }
        if let Some(status) = self.status {
            alert.status = status;
        }
    }
}

fn validate_radius(radius: f64) -> Result<f64, AppError> {
    if radius <= 0.0 || radius > MAX_AFFECTED_RADIUS_KM || radius.is_nan() {
        return Err(AppError::validation(
            "Affected radius must be between 0 and 1000 km",
        ));
    }
    Ok(radius)
}

fn parse_alert_type(raw: &str) -> Result<AlertType, AppError> {
    AlertType::from_str(raw)
        .ok_or_else(|| AppError::Validation(format!("Invalid alert type: {}", raw)))
}

impl CreateAlertRequest {
    pub fn validate(self) -> Result<NewAlert, AppError> {
        let title = required_text(&self.title);
        let alert_type = required_text(&self.alert_type);
        let description = required_text(&self.description);
        let location = required_text(&self.location);

        let (
            Some(title),
            Some(alert_type),
            Some(description),
            Some(location),
            Some(coordinates),
            Some(radius),
        ) = (
            title,
            alert_type,
            description,
            location,
            self.coordinates,
            self.affected_radius,
        )
        else {
            return Err(AppError::validation("Missing required fields"));
        };

        let coordinates = coordinates.into_point().map_err(AppError::Validation)?;
        let affected_radius = validate_radius(radius)?;
        let alert_type = parse_alert_type(&alert_type)?;

        Ok(NewAlert {
            title,
            alert_type,
            description,
            location,
            coordinates,
            affected_radius,
        })
    }
}

impl UpdateAlertRequest {
    /// Blank text fields are ignored rather than clearing the stored value.
    pub fn validate(self) -> Result<AlertChanges, AppError> {
        let alert_type = required_text(&self.alert_type)
            .map(|raw| parse_alert_type(&raw))
            .transpose()?;

        let coordinates = self
            .coordinates
            .map(|c| c.into_point().map_err(AppError::Validation))
            .transpose()?;

        let affected_radius = self.affected_radius.map(validate_radius).transpose()?;

        let status = required_text(&self.status)
            .map(|raw| {
                AlertStatus::from_str(&raw).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Invalid status: {} (expected active or resolved)",
                        raw
                    ))
                })
            })
            .transpose()?;

        Ok(AlertChanges {
            title: required_text(&self.title),
            alert_type,
            description: required_text(&self.description),
            location: required_text(&self.location),
            coordinates,
            affected_radius,
            status,
        })
    }
}
