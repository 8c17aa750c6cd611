//! Normalized directions request/response shared by every provider adapter

use chrono::{NaiveDateTime, TimeDelta};

/// Request handed to a [`crate::services::routing::DirectionsProvider`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionsRequest {
    /// Ask the provider to reorder the intermediate waypoints
    pub optimize: bool,
    /// Intermediate waypoints, already joined with the provider's separator
    pub waypoints: String,
    /// Provider-specific travel mode; the adapter's default when `None`
    pub travel_mode: Option<String>,
    /// `lat,lng` of the start point
    pub origin: String,
    /// `lat,lng` of the final destination
    pub destination: String,
    pub language: String,
    pub region: String,
    pub departure_time: Option<NaiveDateTime>,
    /// Road restrictions; adapters drop what their API does not support
    pub avoid: Vec<String>,
}

/// Overall provider status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionsStatus {
    Ok,
    Failed(String),
}

impl DirectionsStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, DirectionsStatus::Ok)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DirectionsStatus::Ok => "OK",
            DirectionsStatus::Failed(status) => status,
        }
    }
}

/// One travel segment between consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_meters: f64,
    pub duration_seconds: i64,
}

impl Leg {
    pub fn new(distance_meters: f64, duration_seconds: i64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.duration_seconds).unwrap_or(TimeDelta::MAX)
    }
}

/// Totals of a candidate route as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: i64,
}

/// One candidate route
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    pub summary: RouteSummary,
    /// `None` when the provider omitted the legs entirely
    pub legs: Option<Vec<Leg>>,
}

impl DirectionsRoute {
    /// Build a route whose summary is the sum of its legs.
    pub fn from_legs(legs: Vec<Leg>) -> Self {
        let summary = RouteSummary {
            distance_meters: legs.iter().map(|l| l.distance_meters).sum(),
            duration_seconds: legs.iter().map(|l| l.duration_seconds).sum(),
        };
        Self {
            summary,
            legs: Some(legs),
        }
    }
}

/// Position of a submitted waypoint in the optimized sequence.
///
/// Indices count intermediate waypoints only (origin and destination excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaypointOrder {
    /// Index in the waypoint list as it was submitted
    pub provided_index: usize,
    /// Index of the same waypoint in the optimized visiting order
    pub optimized_index: usize,
}

/// Normalized provider response
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResult {
    pub status: DirectionsStatus,
    pub routes: Option<Vec<DirectionsRoute>>,
    /// Present only when reordering was requested and honoured
    pub optimized_order: Option<Vec<WaypointOrder>>,
    /// Raw provider body, kept for diagnostics
    pub raw: Option<String>,
}

impl DirectionsResult {
    pub fn success(routes: Vec<DirectionsRoute>) -> Self {
        Self {
            status: DirectionsStatus::Ok,
            routes: Some(routes),
            optimized_order: None,
            raw: None,
        }
    }

    pub fn failed(status: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            status: DirectionsStatus::Failed(status.into()),
            routes: None,
            optimized_order: None,
            raw: Some(raw.into()),
        }
    }

    pub fn with_optimized_order(mut self, order: Vec<WaypointOrder>) -> Self {
        self.optimized_order = Some(order);
        self
    }
}
