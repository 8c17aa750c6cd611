//! Directions providers: turn-by-turn leg data for an ordered set of waypoints
//!
//! Uses TomTom or Google in production, mock for tests and development.

mod google;
mod tomtom;

pub use google::{GoogleClient, GoogleConfig};
pub use tomtom::{TomTomClient, TomTomConfig};

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::defaults::MOCK_AVERAGE_SPEED_KMH;
use crate::services::geo::distance_between;
use crate::types::{Coordinates, DirectionsRequest, DirectionsResult, DirectionsRoute, Leg, WaypointOrder};

/// Directions provider trait for abstraction (TomTom, Google, mock)
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Request directions. Provider-level failures (bad status, error body)
    /// come back as a failed [`DirectionsResult`]; `Err` means the call
    /// itself did not complete.
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsResult>;

    /// Separator the provider expects between intermediate waypoints
    fn waypoint_separator(&self) -> &'static str;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Which directions provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    TomTom,
    Google,
    #[default]
    Mock,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tomtom" => Ok(ProviderKind::TomTom),
            "google" => Ok(ProviderKind::Google),
            "mock" => Ok(ProviderKind::Mock),
            other => anyhow::bail!("unknown routing provider '{}' (expected tomtom, google or mock)", other),
        }
    }
}

/// Keep the restrictions a provider understands, warning about the rest.
pub(crate) fn supported_restrictions(requested: &[String], supported: &[&str], provider: &str) -> Vec<String> {
    requested
        .iter()
        .filter(|r| {
            let known = supported.contains(&r.as_str());
            if !known {
                warn!("{} does not support avoiding '{}', ignoring it", provider, r);
            }
            known
        })
        .cloned()
        .collect()
}

/// Parse `lat,lng` text as sent to the providers
pub(crate) fn parse_waypoint(text: &str) -> Option<Coordinates> {
    let (lat, lng) = text.split_once(',')?;
    Some(Coordinates::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

/// Mock directions provider for tests.
/// Estimates legs with the geodesic utility and a fixed average speed.
pub struct MockDirectionsProvider {
    average_speed_kmh: f64,
}

impl Default for MockDirectionsProvider {
    fn default() -> Self {
        Self {
            average_speed_kmh: MOCK_AVERAGE_SPEED_KMH,
        }
    }
}

impl MockDirectionsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_speed(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    fn leg(&self, from: &Coordinates, to: &Coordinates) -> Leg {
        let km = distance_between(from, to);
        let seconds = (km / self.average_speed_kmh * 3600.0).round() as i64;
        Leg::new(km * 1000.0, seconds)
    }

    /// Greedy nearest-neighbour visiting order, as indices into `waypoints`
    fn nearest_neighbour(origin: &Coordinates, waypoints: &[Coordinates]) -> Vec<usize> {
        let mut remaining: Vec<usize> = (0..waypoints.len()).collect();
        let mut visit = Vec::with_capacity(waypoints.len());
        let mut current = *origin;

        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_km = f64::INFINITY;
            for (slot, &idx) in remaining.iter().enumerate() {
                let km = distance_between(&current, &waypoints[idx]);
                if km < best_km {
                    best = slot;
                    best_km = km;
                }
            }
            let idx = remaining.remove(best);
            current = waypoints[idx];
            visit.push(idx);
        }

        visit
    }
}

#[async_trait]
impl DirectionsProvider for MockDirectionsProvider {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsResult> {
        let invalid = |what: &str| DirectionsResult::failed("INVALID_REQUEST", format!("unparseable {}", what));

        let Some(origin) = parse_waypoint(&request.origin) else {
            return Ok(invalid("origin"));
        };
        let Some(destination) = parse_waypoint(&request.destination) else {
            return Ok(invalid("destination"));
        };

        let mut waypoints = Vec::new();
        if !request.waypoints.is_empty() {
            for text in request.waypoints.split(self.waypoint_separator()) {
                match parse_waypoint(text) {
                    Some(coords) => waypoints.push(coords),
                    None => return Ok(invalid("waypoint")),
                }
            }
        }

        let visit: Vec<usize> = if request.optimize {
            Self::nearest_neighbour(&origin, &waypoints)
        } else {
            (0..waypoints.len()).collect()
        };

        let mut legs = Vec::with_capacity(visit.len() + 1);
        let mut current = origin;
        for &idx in &visit {
            legs.push(self.leg(&current, &waypoints[idx]));
            current = waypoints[idx];
        }
        legs.push(self.leg(&current, &destination));

        debug!("Mock directions: {} waypoints, {} legs", waypoints.len(), legs.len());

        let result = DirectionsResult::success(vec![DirectionsRoute::from_legs(legs)]);
        if request.optimize {
            let order = visit
                .iter()
                .enumerate()
                .map(|(position, &provided)| WaypointOrder {
                    provided_index: provided,
                    optimized_index: position,
                })
                .collect();
            Ok(result.with_optimized_order(order))
        } else {
            Ok(result)
        }
    }

    fn waypoint_separator(&self) -> &'static str {
        "|"
    }

    fn name(&self) -> &str {
        "MockDirections"
    }
}

/// Create the directions provider selected by `config.routing_provider`.
///
/// Fails when the selected provider's API key is missing.
pub fn create_directions_provider(config: &Config) -> Result<Arc<dyn DirectionsProvider>> {
    let provider: Arc<dyn DirectionsProvider> = match config.routing_provider {
        ProviderKind::Mock => Arc::new(MockDirectionsProvider::new()),
        ProviderKind::TomTom => {
            let api_key = config
                .tomtom_api_key
                .clone()
                .context("TOMTOM_API_KEY must be set for the tomtom routing provider")?;
            Arc::new(TomTomClient::new(
                TomTomConfig::new(api_key).with_timeout(config.http_timeout_seconds),
            )?)
        }
        ProviderKind::Google => {
            let api_key = config
                .google_maps_key
                .clone()
                .context("GOOGLE_MAPS_KEY must be set for the google routing provider")?;
            Arc::new(GoogleClient::new(
                GoogleConfig::new(api_key).with_timeout(config.http_timeout_seconds),
            )?)
        }
    };

    info!("Using {} directions provider", provider.name());
    Ok(provider)
}
