// src/location.rs

use serde::Deserialize;
use serde_json::Value;

use crate::error::MapError;
use crate::geopoint::GeoPoint;

/// A coordinate as it arrives on the wire: a JSON number, or a numeric string
/// (the parks API sends `"44.59824417"`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    fn to_degrees(&self, field: &str) -> Result<f64, MapError> {
        match self {
            CoordinateValue::Number(n) => Ok(*n),
            CoordinateValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                MapError::MalformedEvent(format!("Field '{}' is not a number: {:?}", field, s))
            }),
        }
    }
}

/// The location key shapes produced by the different widgets and data sources.
///
/// Resolved once at ingestion into a [`GeoPoint`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum LocationFields {
    /// `{ "latitude": .., "longitude": .. }`
    LatitudeLongitude {
        latitude: CoordinateValue,
        longitude: CoordinateValue,
    },
    /// `{ "lat": .., "lng": .. }`, the leaflet shape.
    LatLng {
        lat: CoordinateValue,
        lng: CoordinateValue,
    },
    /// `{ "lat": .., "lon": .. }`
    LatLon {
        lat: CoordinateValue,
        lon: CoordinateValue,
    },
}

impl LocationFields {
    /// Decodes a JSON object in any of the accepted shapes into a `GeoPoint`.
    pub fn resolve_value(value: &Value) -> Result<GeoPoint, MapError> {
        let fields = LocationFields::deserialize(value).map_err(|_| {
            MapError::MalformedEvent(format!(
                "Expected {{lat, lng}}, {{lat, lon}} or {{latitude, longitude}}, got {}",
                value
            ))
        })?;
        fields.resolve()
    }

    /// Converts to the canonical `GeoPoint`. Out-of-range values are malformed input.
    pub fn resolve(&self) -> Result<GeoPoint, MapError> {
        let (lat, lon) = match self {
            LocationFields::LatitudeLongitude {
                latitude,
                longitude,
            } => (
                latitude.to_degrees("latitude")?,
                longitude.to_degrees("longitude")?,
            ),
            LocationFields::LatLng { lat, lng } => {
                (lat.to_degrees("lat")?, lng.to_degrees("lng")?)
            }
            LocationFields::LatLon { lat, lon } => {
                (lat.to_degrees("lat")?, lon.to_degrees("lon")?)
            }
        };
        GeoPoint::new(lat, lon).map_err(|e| MapError::MalformedEvent(e.to_string()))
    }
}

/// The first of `keys` present on `value` with a non-null value.
pub(crate) fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
}

impl TryFrom<LocationFields> for GeoPoint {
    type Error = MapError;

    fn try_from(fields: LocationFields) -> Result<Self, Self::Error> {
        fields.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_all_shapes() {
        let expected = GeoPoint::new(43.7696, 11.2558).unwrap();
        for value in [
            json!({"lat": 43.7696, "lng": 11.2558}),
            json!({"lat": 43.7696, "lon": 11.2558}),
            json!({"latitude": 43.7696, "longitude": 11.2558}),
            json!({"latitude": "43.7696", "longitude": " 11.2558 "}),
        ] {
            assert_eq!(LocationFields::resolve_value(&value).unwrap(), expected);
        }
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = LocationFields::resolve_value(&json!({"lat": 43.7})).unwrap_err();
        assert!(matches!(err, MapError::MalformedEvent(_)));
        assert!(LocationFields::resolve_value(&Value::Null).is_err());
    }

    #[test]
    fn test_non_numeric_and_out_of_range_are_malformed() {
        assert!(matches!(
            LocationFields::resolve_value(&json!({"latitude": "", "longitude": "11.2"})),
            Err(MapError::MalformedEvent(_))
        ));
        assert!(matches!(
            LocationFields::resolve_value(&json!({"lat": 120.0, "lng": 11.2})),
            Err(MapError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_first_present_skips_missing_and_null() {
        let value = json!({"southWest": null, "_southWest": {"lat": 1}, "south_west": 2});
        let keys = ["northEast", "southWest", "_southWest", "south_west"];
        assert_eq!(first_present(&value, &keys), Some(&json!({"lat": 1})));
        assert_eq!(first_present(&value, &["northEast"]), None);
        assert_eq!(first_present(&json!([1, 2]), &keys), None);
    }

    #[test]
    fn test_try_from() {
        let fields: LocationFields = serde_json::from_value(json!({"lat": 1, "lng": 2})).unwrap();
        let p = GeoPoint::try_from(fields).unwrap();
        assert_eq!(p, GeoPoint::new(1.0, 2.0).unwrap());
    }
}
