// src/event.rs

use serde_json::Value;

use crate::bounds::BoundingBox;
use crate::error::MapError;
use crate::geopoint::GeoPoint;
use crate::location::{first_present, LocationFields};

const BOUNDS_KEYS: &[&str] = &["bounds"];
const SOUTH_WEST_KEYS: &[&str] = &["southWest", "_southWest", "south_west"];
const NORTH_EAST_KEYS: &[&str] = &["northEast", "_northEast", "north_east"];
const CLICKED_KEYS: &[&str] = &["lastClicked", "last_clicked", "last_object_clicked"];

/// One interaction reported by the map widget.
///
/// Widget payload:
/// `{ "bounds": { "southWest": {lat, lon}, "northEast": {lat, lon} }, "lastClicked": {lat, lon} | null }`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapEvent {
    pub viewport: Option<BoundingBox>,
    pub clicked: Option<GeoPoint>,
}

fn decode_viewport(payload: &Value) -> Result<BoundingBox, MapError> {
    let bounds = first_present(payload, BOUNDS_KEYS)
        .ok_or_else(|| MapError::MalformedEvent("Event has no bounds".to_string()))?;
    let south_west = first_present(bounds, SOUTH_WEST_KEYS)
        .ok_or_else(|| MapError::MalformedEvent("Bounds have no southWest corner".to_string()))?;
    let north_east = first_present(bounds, NORTH_EAST_KEYS)
        .ok_or_else(|| MapError::MalformedEvent("Bounds have no northEast corner".to_string()))?;
    Ok(BoundingBox::new(
        LocationFields::resolve_value(south_west)?,
        LocationFields::resolve_value(north_east)?,
    ))
}

fn decode_clicked(payload: &Value) -> Result<Option<GeoPoint>, MapError> {
    first_present(payload, CLICKED_KEYS)
        .map(LocationFields::resolve_value)
        .transpose()
}

impl MapEvent {
    pub fn new(viewport: Option<BoundingBox>, clicked: Option<GeoPoint>) -> Self {
        MapEvent { viewport, clicked }
    }

    /// Strict decoding: bounds are required, a click is optional but must be
    /// well formed when present.
    pub fn from_value(payload: &Value) -> Result<Self, MapError> {
        if !payload.is_object() {
            return Err(MapError::MalformedEvent(format!(
                "Event payload must be an object, got {}",
                payload
            )));
        }
        Ok(MapEvent {
            viewport: Some(decode_viewport(payload)?),
            clicked: decode_clicked(payload)?,
        })
    }

    /// Decodes viewport and click independently; anything missing or malformed is
    /// treated as absent. Widgets report incomplete payloads while they initialize.
    pub fn from_value_lenient(payload: &Value) -> Self {
        let viewport = decode_viewport(payload)
            .map_err(|e| log::debug!("Ignoring viewport: {}", e))
            .ok();
        let clicked = decode_clicked(payload)
            .map_err(|e| log::debug!("Ignoring click: {}", e))
            .ok()
            .flatten();
        MapEvent { viewport, clicked }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, MapError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(&value)
    }

    pub fn is_empty(&self) -> bool {
        self.viewport.is_none() && self.clicked.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "bounds": {
                "southWest": {"lat": 43.75, "lng": 11.20},
                "northEast": {"lat": 43.80, "lng": 11.30}
            },
            "lastClicked": {"lat": 43.7696, "lng": 11.2558}
        })
    }

    #[test]
    fn test_from_value_full() {
        let e = MapEvent::from_value(&full_payload()).unwrap();
        let vp = e.viewport.unwrap();
        assert_eq!(vp.south_west, GeoPoint::new(43.75, 11.20).unwrap());
        assert_eq!(vp.north_east, GeoPoint::new(43.80, 11.30).unwrap());
        assert_eq!(e.clicked, Some(GeoPoint::new(43.7696, 11.2558).unwrap()));
    }

    #[test]
    fn test_leaflet_aliases() {
        let payload = json!({
            "bounds": {
                "_southWest": {"lat": 43.75, "lon": 11.20},
                "_northEast": {"latitude": 43.80, "longitude": 11.30}
            },
            "last_object_clicked": {"lat": 43.77, "lng": 11.25}
        });
        let e = MapEvent::from_value(&payload).unwrap();
        assert!(e.viewport.is_some());
        assert!(e.clicked.is_some());
    }

    #[test]
    fn test_null_click_is_absent() {
        let mut payload = full_payload();
        payload["lastClicked"] = Value::Null;
        let e = MapEvent::from_value(&payload).unwrap();
        assert!(e.clicked.is_none());
        assert!(e.viewport.is_some());
    }

    #[test]
    fn test_strict_rejects_missing_bounds() {
        let err = MapEvent::from_value(&json!({"lastClicked": {"lat": 1, "lng": 2}})).unwrap_err();
        assert!(matches!(err, MapError::MalformedEvent(_)));
        assert!(MapEvent::from_value(&json!([1, 2])).is_err());
        assert!(MapEvent::from_json_str("not json").is_err());
    }

    #[test]
    fn test_lenient_keeps_good_parts() {
        let payload = json!({
            "bounds": {"southWest": {"lat": 43.75}, "northEast": {"lat": 43.80, "lng": 11.30}},
            "lastClicked": {"lat": 43.7696, "lng": 11.2558}
        });
        let e = MapEvent::from_value_lenient(&payload);
        assert!(e.viewport.is_none());
        assert_eq!(e.clicked, Some(GeoPoint::new(43.7696, 11.2558).unwrap()));

        let mut bad_click = full_payload();
        bad_click["lastClicked"] = json!({"lat": "x", "lng": 11.0});
        let e = MapEvent::from_value_lenient(&bad_click);
        assert!(e.viewport.is_some());
        assert!(e.clicked.is_none());
    }

    #[test]
    fn test_lenient_never_fails() {
        for payload in [Value::Null, json!(42), json!({}), json!({"bounds": null})] {
            assert!(MapEvent::from_value_lenient(&payload).is_empty());
        }
    }
}
