// src/record.rs

use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

/// Anything that can be placed on the map.
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

/// A geo-tagged record shown as a marker. Immutable once fetched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: GeoPoint,
    pub intensity: f64,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: GeoPoint,
        intensity: f64,
    ) -> Self {
        Record {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            location,
            intensity,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Located for Record {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

impl<T: Located> Located for &T {
    fn location(&self) -> GeoPoint {
        (**self).location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_checks_location() {
        let record: Record = serde_json::from_value(json!({
            "id": "1",
            "name": "Osteria",
            "location": {"lat": 43.7696, "lng": 11.2558},
            "intensity": 45.0
        }))
        .unwrap();
        assert_eq!(record.location, GeoPoint::new(43.7696, 11.2558).unwrap());
        assert!(record.description.is_empty());

        let out_of_range = serde_json::from_value::<Record>(json!({
            "id": "2",
            "name": "Nowhere",
            "location": {"latitude": 95.0, "longitude": 11.2558},
            "intensity": 45.0
        }));
        assert!(out_of_range.is_err());
    }

    #[test]
    fn test_serialize_round_trips() {
        let record = Record::new("1", "Osteria", GeoPoint::new(43.7696, 11.2558).unwrap(), 45.0)
            .with_description("Loud");
        let back: Record = serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }
}
