//! Itinerary planner: validation, waypoint assembly, provider call and timing
//! in one place.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::config::Config;
use crate::defaults::{DEFAULT_LANGUAGE, DEFAULT_REGION};
use crate::error::{ItineraryError, ItineraryResult};
use crate::services::geocoding::{create_resolver, CoordinateResolver};
use crate::services::itinerary::{compute_fixed_order, compute_optimized};
use crate::services::routing::{create_directions_provider, DirectionsProvider};
use crate::services::validator::validate;
use crate::services::waypoints::build_waypoints;
use crate::types::{DirectionsRequest, Route, TimingConfiguration};

pub use crate::services::waypoints::UnresolvedPolicy;

/// Request fields that do not depend on the route
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    /// Provider default when `None`
    pub travel_mode: Option<String>,
    pub language: String,
    pub region: String,
    pub avoid: Vec<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            travel_mode: None,
            language: DEFAULT_LANGUAGE.to_string(),
            region: DEFAULT_REGION.to_string(),
            avoid: Vec::new(),
        }
    }
}

/// Plans timed itineraries against one directions provider
pub struct ItineraryPlanner {
    provider: Arc<dyn DirectionsProvider>,
    resolver: Arc<dyn CoordinateResolver>,
    timing: TimingConfiguration,
    defaults: RequestDefaults,
    unresolved_policy: UnresolvedPolicy,
}

impl ItineraryPlanner {
    pub fn new(
        provider: Arc<dyn DirectionsProvider>,
        resolver: Arc<dyn CoordinateResolver>,
        timing: TimingConfiguration,
    ) -> Self {
        Self {
            provider,
            resolver,
            timing,
            defaults: RequestDefaults::default(),
            unresolved_policy: UnresolvedPolicy::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }

    /// Wire provider, resolver and timing from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_directions_provider(config)?;
        let resolver = create_resolver(config)?;

        Ok(Self::new(provider, resolver, config.timing)
            .with_defaults(RequestDefaults {
                travel_mode: None,
                language: config.language.clone(),
                region: config.region.clone(),
                avoid: config.avoid.clone(),
            })
            .with_unresolved_policy(config.unresolved_policy))
    }

    /// Time the route in the caller's stop order.
    pub async fn plan(&self, route: Route, departure: NaiveDateTime) -> ItineraryResult<Route> {
        self.run(route, departure, false).await
    }

    /// Let the provider reorder the stops, then time them.
    pub async fn plan_optimized(&self, route: Route, departure: NaiveDateTime) -> ItineraryResult<Route> {
        self.run(route, departure, true).await
    }

    async fn run(&self, mut route: Route, departure: NaiveDateTime, optimize: bool) -> ItineraryResult<Route> {
        validate(&route)?;

        let plan = build_waypoints(
            &route,
            self.resolver.as_ref(),
            self.provider.waypoint_separator(),
            self.unresolved_policy,
        )
        .await?;

        let request = DirectionsRequest {
            optimize,
            waypoints: plan.waypoints,
            travel_mode: self.defaults.travel_mode.clone(),
            origin: plan.origin.to_waypoint(),
            destination: plan.destination,
            language: self.defaults.language.clone(),
            region: self.defaults.region.clone(),
            departure_time: Some(departure),
            avoid: self.defaults.avoid.clone(),
        };

        debug!(
            "Requesting directions from {} for {} stops (optimize: {})",
            self.provider.name(),
            plan.stops.len(),
            optimize
        );

        let result = self
            .provider
            .route(&request)
            .await
            .map_err(ItineraryError::Provider)?;

        // Resolved coordinates are kept on the returned stops.
        route.stops = plan.stops;

        let route = if optimize {
            compute_optimized(route, departure, &self.timing, &result)?
        } else {
            compute_fixed_order(route, departure, &self.timing, &result)?
        };

        info!(
            "Planned route {:?}: {} stops, {:.2} km, {}s",
            route.start_id(),
            route.stops.len(),
            route.distance_total_km,
            route.duration_total.num_seconds()
        );

        Ok(route)
    }
}
