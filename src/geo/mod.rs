//! Geographic primitives.
//!
//! Camps carry a `{lat, lng}` pair while alerts carry a GeoJSON Point
//! (`[longitude, latitude]`). Both normalize to [`LatLng`] for distance math.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, the value 2dsphere geometry uses.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check both components are finite and inside their ranges.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err("Invalid coordinates".to_string());
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err("Invalid coordinates".to_string());
        }
        Ok(())
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }

    /// Latitude band `(min, max)` that contains every point within `meters`.
    pub fn latitude_band(&self, meters: f64) -> (f64, f64) {
        let delta = (meters / EARTH_RADIUS_METERS).to_degrees();
        ((self.lat - delta).max(-90.0), (self.lat + delta).min(90.0))
    }
}

/// GeoJSON Point, longitude first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![lng, lat],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.first().copied().unwrap_or_default()
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.get(1).copied().unwrap_or_default()
    }

    /// Exactly two coordinates, both in range.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "Point" || self.coordinates.len() != 2 {
            return Err("Invalid coordinates".to_string());
        }
        self.to_lat_lng().validate()
    }

    pub fn to_lat_lng(&self) -> LatLng {
        LatLng::new(self.latitude(), self.longitude())
    }
}

/// Coordinates as clients send them: a bare `[lng, lat]` array or a Point.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordinatesInput {
    Pair(Vec<f64>),
    Point(GeoPoint),
}

impl CoordinatesInput {
    /// Normalize to a validated GeoJSON Point.
    pub fn into_point(self) -> Result<GeoPoint, String> {
        let point = match self {
            CoordinatesInput::Pair(coordinates) => GeoPoint {
                kind: "Point".to_string(),
                coordinates,
            },
            CoordinatesInput::Point(point) => point,
        };
        point.validate()?;
        Ok(point)
    }
}

/// Keep items within `max_distance` meters of `center`, nearest first.
///
/// Returns each survivor paired with its distance.
pub fn nearest_within<T, F>(
    items: Vec<T>,
    center: &LatLng,
    max_distance: f64,
    locate: F,
) -> Vec<(T, f64)>
where
    F: Fn(&T) -> LatLng,
{
    let mut hits: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let distance = center.distance_to(&locate(&item));
            (item, distance)
        })
        .filter(|(_, distance)| *distance <= max_distance)
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlng_range() {
        assert!(LatLng::new(90.0, 180.0).validate().is_ok());
        assert!(LatLng::new(-90.0, -180.0).validate().is_ok());
        assert!(LatLng::new(95.0, 0.0).validate().is_err());
        assert!(LatLng::new(0.0, 180.5).validate().is_err());
        assert!(LatLng::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_point_is_longitude_first() {
        let point = GeoPoint::new(77.25, 12.5);
        assert_eq!(point.coordinates, vec![77.25, 12.5]);
        assert_eq!(point.to_lat_lng(), LatLng::new(12.5, 77.25));
    }

    #[test]
    fn test_point_requires_two_coordinates() {
        let point = GeoPoint {
            kind: "Point".to_string(),
            coordinates: vec![1.0, 2.0, 3.0],
        };
        assert!(point.validate().is_err());

        // latitude 120 is out of range even though longitude 120 would not be
        assert!(GeoPoint::new(10.0, 120.0).validate().is_err());
    }

    #[test]
    fn test_coordinates_input_accepts_both_shapes() {
        let pair: CoordinatesInput = serde_json::from_str("[77.5, 12.9]").unwrap();
        assert_eq!(pair.into_point().unwrap(), GeoPoint::new(77.5, 12.9));

        let point: CoordinatesInput =
            serde_json::from_str(r#"{"type":"Point","coordinates":[77.5,12.9]}"#).unwrap();
        assert_eq!(point.into_point().unwrap(), GeoPoint::new(77.5, 12.9));
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = LatLng::new(0.0, 0.0).distance_to(&LatLng::new(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * 1f64.to_radians();
        assert!((d - expected).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_nearest_within_filters_and_orders() {
        let center = LatLng::new(0.0, 0.0);
        let points = vec![
            ("far", LatLng::new(0.6, 0.0)),
            ("near", LatLng::new(0.1, 0.0)),
            ("mid", LatLng::new(0.3, 0.0)),
        ];

        let hits = nearest_within(points, &center, 50_000.0, |(_, p)| *p);
        let names: Vec<_> = hits.iter().map(|((name, _), _)| *name).collect();
        assert_eq!(names, vec!["near", "mid"]);
    }

    #[test]
    fn test_latitude_band_covers_radius() {
        let (min, max) = LatLng::new(10.0, 0.0).latitude_band(EARTH_RADIUS_METERS * 1f64.to_radians());
        assert!((min - 9.0).abs() < 1e-3);
        assert!((max - 11.0).abs() < 1e-3);
    }
}
