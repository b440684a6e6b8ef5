// src/geopoint.rs

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::location::LocationFields;

/// Represents a geographical point in WGS84 degrees.
///
/// Deserializing goes through [`LocationFields`], so every decoded point passes
/// the same range check as [`GeoPoint::new`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "LocationFields")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new `GeoPoint`.
    ///
    /// # Errors
    /// Returns `MapError::InvalidCoordinate` if latitude is not between -90 and 90,
    /// longitude is not between -180 and 180, or either value is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MapError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90 degrees, got {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180 degrees, got {}",
                longitude
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    /// True when both coordinates lie within `tolerance` degrees of `other`'s,
    /// boundary included.
    pub fn within_tolerance(&self, other: &GeoPoint, tolerance: f64) -> bool {
        axis_within(self.latitude, other.latitude, tolerance)
            && axis_within(self.longitude, other.longitude, tolerance)
    }
}

/// `|a - b| <= tolerance`, allowing for the rounding of the decimal inputs so that
/// 43.7697 vs 43.7696 still counts as exactly 0.0001 apart.
fn axis_within(a: f64, b: f64, tolerance: f64) -> bool {
    let slack = 4.0 * f64::EPSILON * a.abs().max(b.abs());
    (a - b).abs() <= tolerance + slack
}
