//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Straight line to road distance adjustment (+16%)
const ROAD_ADJUSTMENT: f64 = 1.16;

/// Estimated road distance in kilometers between two lat/lon pairs (decimal degrees).
///
/// Great-circle distance by the spherical law of cosines, scaled by
/// [`ROAD_ADJUSTMENT`]. Quick estimate only; not used by the itinerary engine.
pub fn distance_between_coords(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    // Rounding can push the cosine just outside [-1, 1] for identical points.
    let cos_angle = (lat1.cos() * lat2.cos() * d_lon.cos() + lat1.sin() * lat2.sin()).clamp(-1.0, 1.0);

    EARTH_RADIUS_KM * cos_angle.acos() * ROAD_ADJUSTMENT
}

/// [`distance_between_coords`] for two coordinate values
pub fn distance_between(from: &Coordinates, to: &Coordinates) -> f64 {
    distance_between_coords(from.lat, from.lng, to.lat, to.lng)
}
