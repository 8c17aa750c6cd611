//! Google Maps directions and geocoding client
//!
//! Directions API documentation:
//! https://developers.google.com/maps/documentation/directions/get-directions

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{supported_restrictions, DirectionsProvider};
use crate::defaults::{DEFAULT_GOOGLE_TRAVEL_MODE, DEFAULT_HTTP_TIMEOUT_SECONDS};
use crate::services::geocoding::{has_search_terms, CoordinateResolver};
use crate::types::{
    Coordinates, DirectionsRequest, DirectionsResult, DirectionsRoute, DirectionsStatus, Leg, WaypointOrder,
};

/// Road restrictions the directions endpoint accepts
pub const GOOGLE_RESTRICTIONS: &[&str] = &["tolls", "highways", "ferries"];

/// Google client configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    /// Base URL (e.g., "https://maps.googleapis.com")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl GoogleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://maps.googleapis.com".to_string(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Google directions and geocoding client
pub struct GoogleClient {
    client: Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the directions URL. `departure_time` is only sent when it lies
    /// after `now`; the API rejects past departures.
    fn directions_url(&self, request: &DirectionsRequest, now: NaiveDateTime) -> String {
        let travel_mode = request
            .travel_mode
            .as_deref()
            .unwrap_or(DEFAULT_GOOGLE_TRAVEL_MODE);

        let mut url = format!(
            "{}/maps/api/directions/json?origin={}&destination={}",
            self.config.base_url,
            urlencoding::encode(&request.origin),
            urlencoding::encode(&request.destination)
        );

        if !request.waypoints.is_empty() {
            url.push_str("&waypoints=");
            if request.optimize {
                url.push_str("optimize:true|");
            }
            url.push_str(&urlencoding::encode(&request.waypoints));
        }

        url.push_str(&format!(
            "&region={}&alternatives=false&language={}&mode={}&key={}",
            urlencoding::encode(&request.region),
            urlencoding::encode(&request.language),
            urlencoding::encode(travel_mode),
            urlencoding::encode(&self.config.api_key)
        ));

        if let Some(departure) = request.departure_time.filter(|t| *t > now) {
            url.push_str(&format!("&departure_time={}", departure.and_utc().timestamp()));
        }

        let avoid = supported_restrictions(&request.avoid, GOOGLE_RESTRICTIONS, "Google");
        if !avoid.is_empty() {
            url.push_str("&avoid=");
            url.push_str(&avoid.join("|"));
        }

        url
    }

    fn geocode_url(&self, address: &str) -> String {
        format!(
            "{}/maps/api/geocode/json?address={}&key={}",
            self.config.base_url,
            urlencoding::encode(address.trim()),
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(self.geocode_url(address))
            .send()
            .await
            .context("Failed to send geocoding request to Google")?;

        if !response.status().is_success() {
            anyhow::bail!("Google geocoding returned status {}", response.status());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse Google geocoding response")?;

        Ok(body.first_location())
    }
}

/// Normalize a directions answer. Kept free of I/O for testing.
fn parse_directions(http_status: u16, body: &str) -> DirectionsResult {
    if !(200..300).contains(&http_status) {
        return DirectionsResult::failed(http_status.to_string(), body);
    }

    let parsed: DirectionsResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unreadable Google response: {}", e);
            return DirectionsResult::failed("INVALID_RESPONSE", body);
        }
    };

    if parsed.status != "OK" {
        if let Some(message) = &parsed.error_message {
            warn!("Google directions status {}: {}", parsed.status, message);
        }
        return DirectionsResult::failed(parsed.status, body);
    }

    let optimized_order = parsed
        .routes
        .as_ref()
        .and_then(|routes| routes.first())
        .and_then(|route| route.waypoint_order.as_ref())
        .map(|order| {
            order
                .iter()
                .enumerate()
                .map(|(position, &provided)| WaypointOrder {
                    provided_index: provided,
                    optimized_index: position,
                })
                .collect()
        });

    let routes = parsed.routes.map(|routes| {
        routes
            .into_iter()
            .map(|route| match route.legs {
                Some(legs) => DirectionsRoute::from_legs(
                    legs.into_iter()
                        .map(|leg| Leg::new(leg.distance.value, leg.duration.value))
                        .collect(),
                ),
                None => DirectionsRoute {
                    summary: Default::default(),
                    legs: None,
                },
            })
            .collect()
    });

    DirectionsResult {
        status: DirectionsStatus::Ok,
        routes,
        optimized_order,
        raw: Some(body.to_string()),
    }
}

#[async_trait]
impl DirectionsProvider for GoogleClient {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsResult> {
        let url = self.directions_url(request, Utc::now().naive_utc());
        debug!("Requesting Google directions (optimize: {})", request.optimize);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Google")?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read Google response body")?;

        Ok(parse_directions(status, &body))
    }

    fn waypoint_separator(&self) -> &'static str {
        "|"
    }

    fn name(&self) -> &str {
        "Google"
    }
}

#[async_trait]
impl CoordinateResolver for GoogleClient {
    /// Google has no district/city filter; both only gate the query.
    async fn resolve(&self, address: &str, district: &str, city: &str) -> Option<Coordinates> {
        if !has_search_terms(address, district, city) {
            return None;
        }

        match self.geocode(address).await {
            Ok(coords) => coords,
            Err(e) => {
                warn!("Google geocoding failed for '{}': {:#}", address, e);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

// ==========================================================================
// Google API types
// ==========================================================================

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    error_message: Option<String>,
    routes: Option<Vec<GoogleRoute>>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    legs: Option<Vec<GoogleLeg>>,
    waypoint_order: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    distance: GoogleValue<f64>,
    duration: GoogleValue<i64>,
}

#[derive(Debug, Deserialize)]
struct GoogleValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn first_location(&self) -> Option<Coordinates> {
        if self.status != "OK" {
            return None;
        }
        self.results
            .first()
            .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
    }
}
