// src/viewport.rs
//
// Pure functions over the session's record collection. Nothing here keeps state.

use crate::bounds::BoundingBox;
use crate::geopoint::GeoPoint;
use crate::record::Located;

/// Per-axis distance in degrees under which a click lands on a record.
pub const DEFAULT_CLICK_TOLERANCE: f64 = 0.0001;

/// Returns every record whose location lies inside `bounds`, edges included,
/// in input order. An inverted box yields nothing.
pub fn filter_visible<'a, T: Located>(records: &'a [T], bounds: &BoundingBox) -> Vec<&'a T> {
    if bounds.is_inverted() {
        log::debug!("Inverted viewport {:?}, nothing is visible", bounds);
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| bounds.contains(&r.location()))
        .collect()
}

/// Resolves a clicked coordinate to the first record (input order) whose
/// latitude and longitude are each within `tolerance` degrees of it.
///
/// This is first-match-wins, not nearest-match: with densely packed markers a
/// click may resolve to an earlier record that is farther away than a later one.
pub fn resolve_click<T: Located>(records: &[T], clicked: GeoPoint, tolerance: f64) -> Option<&T> {
    records
        .iter()
        .find(|r| r.location().within_tolerance(&clicked, tolerance))
}
