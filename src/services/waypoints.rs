//! Waypoint sequencing: stop ordering, coordinate backfill and request assembly.
//!
//! The order fixed here is the order the itinerary engine later zips legs
//! against, so both sides share [`stop_roles`].

use tracing::{debug, warn};

use crate::error::{ItineraryError, ItineraryResult};
use crate::services::geocoding::CoordinateResolver;
use crate::types::{Coordinates, Route, Stop};

/// What to do when a stop's coordinates cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Keep the stop as a waypoint with empty coordinate text and let the
    /// provider reject it
    #[default]
    Continue,
    /// Abort with [`ItineraryError::CoordinateResolution`]
    Fail,
}

impl std::str::FromStr for UnresolvedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(UnresolvedPolicy::Continue),
            "fail" => Ok(UnresolvedPolicy::Fail),
            other => anyhow::bail!("unknown unresolved policy '{}' (expected continue or fail)", other),
        }
    }
}

/// How a sorted stop takes part in the waypoint request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopRole {
    /// Sent as an intermediate waypoint; consumes one leg
    Waypoint,
    /// Leading entry carrying the start point's identity; it is the origin
    StartMarker,
    /// Trailing entry carrying the start point's identity; reached by the return leg
    ReturnMarker,
    /// No identity; never sent
    Skipped,
}

/// Sort stops by sequence key. The sort is stable, ties keep input order.
pub fn sort_stops(stops: &mut [Stop]) {
    stops.sort_by_key(|s| s.order);
}

/// Classify already sorted stops.
pub(crate) fn stop_roles(sorted: &[Stop], start_id: Option<&str>) -> Vec<StopRole> {
    let last = sorted.len().saturating_sub(1);

    sorted
        .iter()
        .enumerate()
        .map(|(pos, stop)| match stop.identity() {
            None => StopRole::Skipped,
            Some(id) if Some(id) == start_id && pos == last => StopRole::ReturnMarker,
            Some(id) if Some(id) == start_id && pos == 0 => StopRole::StartMarker,
            Some(_) => StopRole::Waypoint,
        })
        .collect()
}

/// Assembled request data for one route
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPlan {
    /// Stops sorted by sequence key, coordinates backfilled where resolved
    pub stops: Vec<Stop>,
    /// Intermediate waypoints joined with the provider separator
    pub waypoints: String,
    pub origin: Coordinates,
    /// Destination text; `,` when the last stop has no coordinates
    pub destination: String,
    /// Identities of waypoint stops still lacking coordinates
    pub unresolved: Vec<String>,
}

#[cfg(test)]
impl WaypointPlan {
    /// Number of stops sent as intermediate waypoints
    pub fn waypoint_count(&self, start_id: Option<&str>) -> usize {
        stop_roles(&self.stops, start_id)
            .into_iter()
            .filter(|r| *r == StopRole::Waypoint)
            .count()
    }
}

/// Sort the stops, resolve missing coordinates and serialize the waypoint list.
///
/// The route itself is not touched; the returned plan carries the sorted,
/// backfilled copy of its stops.
pub async fn build_waypoints(
    route: &Route,
    resolver: &dyn CoordinateResolver,
    separator: &str,
    policy: UnresolvedPolicy,
) -> ItineraryResult<WaypointPlan> {
    let origin = route
        .start_point
        .as_ref()
        .and_then(|s| s.coordinates)
        .ok_or_else(|| ItineraryError::InvalidRouteStructure("start point has no coordinates".into()))?;
    let start_id = route.start_id();

    let mut stops = route.stops.clone();
    sort_stops(&mut stops);
    let roles = stop_roles(&stops, start_id);

    let mut points: Vec<String> = Vec::new();
    let mut unresolved = Vec::new();

    for (stop, role) in stops.iter_mut().zip(&roles) {
        if *role != StopRole::Waypoint {
            continue;
        }

        if stop.coordinates.is_none() {
            let search = stop.search_address();
            debug!("Resolving coordinates for stop {:?} via {}", stop.id, resolver.name());
            stop.coordinates = resolver
                .resolve(&search, stop.district.trim(), stop.city.trim())
                .await;
        }

        match stop.coordinates {
            Some(coords) => points.push(coords.to_waypoint()),
            None => {
                let stop_id = stop.identity().unwrap_or_default().to_string();
                if policy == UnresolvedPolicy::Fail {
                    return Err(ItineraryError::CoordinateResolution { stop_id });
                }
                warn!("Stop {} has no coordinates, sending it without a position", stop_id);
                points.push(",".to_string());
                unresolved.push(stop_id);
            }
        }
    }

    let destination = match stops.last() {
        Some(last) if last.identity().is_some() && last.identity() == start_id => origin.to_waypoint(),
        Some(last) => match last.coordinates {
            Some(coords) => coords.to_waypoint(),
            None => {
                let stop_id = last.identity().unwrap_or_default().to_string();
                if policy == UnresolvedPolicy::Fail {
                    return Err(ItineraryError::CoordinateResolution { stop_id });
                }
                warn!("Destination stop {} has no coordinates, sending it without a position", stop_id);
                if !unresolved.contains(&stop_id) {
                    unresolved.push(stop_id);
                }
                ",".to_string()
            }
        },
        None => origin.to_waypoint(),
    };

    debug!(
        "Built {} waypoints for route starting at {:?} ({} unresolved)",
        points.len(),
        start_id,
        unresolved.len()
    );

    Ok(WaypointPlan {
        stops,
        waypoints: points.join(separator),
        origin,
        destination,
        unresolved,
    })
}
