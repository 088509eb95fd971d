//! REST API module.
//!
//! Handlers return the persisted entity (or a list of them) as the body;
//! failures go through [`AppError`] as `{"error": ...}`.

mod activities;
mod alerts;
mod auth;
mod camps;
mod dashboard;
mod resources;

pub use activities::*;
pub use alerts::*;
pub use auth::*;
pub use camps::*;
pub use dashboard::*;
pub use resources::*;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::geo::LatLng;

/// Response type shared by all handlers.
pub type ApiResult<T> = Result<T, AppError>;

/// JSON body extractor whose rejections come back as 400 `{"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections come back as 400 `{"error": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// 201 with the created entity as the body.
pub fn created<T>(value: T) -> ApiResult<(StatusCode, Json<T>)> {
    Ok((StatusCode::CREATED, Json(value)))
}

/// Query parameters of the proximity endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityQuery {
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Meters
    #[serde(default)]
    pub max_distance: Option<f64>,
}

impl ProximityQuery {
    /// Center point and radius, falling back to `default_distance` meters.
    pub fn resolve(&self, default_distance: f64) -> Result<(LatLng, f64), AppError> {
        let (Some(longitude), Some(latitude)) = (self.longitude, self.latitude) else {
            return Err(AppError::validation("Longitude and latitude are required"));
        };

        let center = LatLng::new(latitude, longitude);
        center.validate().map_err(AppError::Validation)?;

        let max_distance = self.max_distance.unwrap_or(default_distance);
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(AppError::validation("maxDistance must be a non-negative number"));
        }

        Ok((center, max_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_defaults_and_requirements() {
        let query = ProximityQuery {
            longitude: Some(77.0),
            latitude: Some(12.0),
            max_distance: None,
        };
        let (center, distance) = query.resolve(50_000.0).unwrap();
        assert_eq!(center, LatLng::new(12.0, 77.0));
        assert_eq!(distance, 50_000.0);

        let missing = ProximityQuery {
            longitude: None,
            latitude: Some(12.0),
            max_distance: None,
        };
        assert_eq!(
            missing.resolve(50_000.0).unwrap_err().message(),
            "Longitude and latitude are required"
        );

        let negative = ProximityQuery {
            longitude: Some(0.0),
            latitude: Some(0.0),
            max_distance: Some(-1.0),
        };
        assert!(negative.resolve(10_000.0).is_err());
    }
}
