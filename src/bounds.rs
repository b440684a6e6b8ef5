// src/bounds.rs

use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

/// The rectangular lat/lon region currently visible on the map.
///
/// `south_west` must not lie north or east of `north_east`. The widget does not
/// guarantee this, so the invariant is checked at use: an inverted box contains
/// nothing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BoundingBox {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        BoundingBox {
            south_west,
            north_east,
        }
    }

    /// True if either axis has its south-west bound above its north-east bound.
    pub fn is_inverted(&self) -> bool {
        self.south_west.latitude > self.north_east.latitude
            || self.south_west.longitude > self.north_east.longitude
    }

    /// Closed-interval containment on both axes.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        !self.is_inverted()
            && point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude
            && point.longitude >= self.south_west.longitude
            && point.longitude <= self.north_east.longitude
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.south_west.latitude + self.north_east.latitude) / 2.0,
            longitude: (self.south_west.longitude + self.north_east.longitude) / 2.0,
        }
    }
}
