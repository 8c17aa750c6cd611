//! Structural checks run before any routing work

use crate::error::{ItineraryError, ItineraryResult};
use crate::types::Route;

/// Check that the route has a usable start point and at least one stop.
pub fn validate(route: &Route) -> ItineraryResult<()> {
    let start = route
        .start_point
        .as_ref()
        .ok_or_else(|| ItineraryError::InvalidRouteStructure("route has no start point".into()))?;

    if route.start_id().is_none() {
        return Err(ItineraryError::InvalidRouteStructure(
            "start point has no identity".into(),
        ));
    }

    if start.coordinates.is_none() {
        return Err(ItineraryError::InvalidRouteStructure(
            "start point has no coordinates".into(),
        ));
    }

    if route.stops.is_empty() {
        return Err(ItineraryError::InsufficientStops);
    }

    Ok(())
}
