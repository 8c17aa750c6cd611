//! TomTom routing and search client
//!
//! Routing API documentation:
//! https://developer.tomtom.com/routing-api/documentation/routing/calculate-route

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{supported_restrictions, DirectionsProvider};
use crate::defaults::{DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_TOMTOM_TRAVEL_MODE};
use crate::services::geocoding::{has_search_terms, CoordinateResolver};
use crate::types::{
    Coordinates, DirectionsRequest, DirectionsResult, DirectionsRoute, DirectionsStatus, Leg, RouteSummary,
    WaypointOrder,
};

/// Road restrictions the calculateRoute endpoint accepts
pub const TOMTOM_RESTRICTIONS: &[&str] = &[
    "tollRoads",
    "motorways",
    "ferries",
    "unpavedRoads",
    "carpools",
    "alreadyUsedRoads",
    "borderCrossings",
];

/// TomTom client configuration
#[derive(Debug, Clone)]
pub struct TomTomConfig {
    pub api_key: String,
    /// Base URL (e.g., "https://api.tomtom.com")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl TomTomConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.tomtom.com".to_string(),
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

/// TomTom routing and geocoding client
pub struct TomTomClient {
    client: Client,
    config: TomTomConfig,
}

impl TomTomClient {
    pub fn new(config: TomTomConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Build the calculateRoute URL; locations are `origin:waypoints:destination`
    fn directions_url(&self, request: &DirectionsRequest) -> String {
        let mut locations = vec![request.origin.as_str()];
        if !request.waypoints.is_empty() {
            locations.push(request.waypoints.as_str());
        }
        locations.push(request.destination.as_str());

        let depart_at = request
            .departure_time
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
            .unwrap_or_else(|| "now".to_string());
        let travel_mode = request
            .travel_mode
            .as_deref()
            .unwrap_or(DEFAULT_TOMTOM_TRAVEL_MODE);

        let mut url = format!(
            "{}/routing/1/calculateRoute/{}/json?key={}",
            self.config.base_url,
            locations.join(":"),
            urlencoding::encode(&self.config.api_key)
        );
        if request.optimize {
            url.push_str("&computeBestOrder=true&routeType=shortest");
        }
        url.push_str(&format!(
            "&traffic=true&language={}&departAt={}&travelMode={}",
            urlencoding::encode(&request.language),
            urlencoding::encode(&depart_at),
            urlencoding::encode(travel_mode)
        ));

        for restriction in supported_restrictions(&request.avoid, TOMTOM_RESTRICTIONS, "TomTom") {
            url.push_str("&avoid=");
            url.push_str(&restriction);
        }

        url
    }

    fn geocode_url(&self, address: &str) -> String {
        format!(
            "{}/search/2/geocode/{}.json?key={}",
            self.config.base_url,
            urlencoding::encode(address.trim()),
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn geocode(&self, address: &str, district: &str, city: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(self.geocode_url(address))
            .send()
            .await
            .context("Failed to send geocoding request to TomTom")?;

        if !response.status().is_success() {
            anyhow::bail!("TomTom geocoding returned status {}", response.status());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse TomTom geocoding response")?;

        Ok(body.accepted_position(district, city))
    }
}

/// Normalize a calculateRoute answer. Kept free of I/O for testing.
fn parse_calculate_route(http_status: u16, body: &str) -> DirectionsResult {
    if !(200..300).contains(&http_status) {
        return DirectionsResult::failed(http_status.to_string(), body);
    }

    let parsed: CalculateRouteResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unreadable TomTom response: {}", e);
            return DirectionsResult::failed("INVALID_RESPONSE", body);
        }
    };

    if let Some(error) = parsed.error {
        warn!(
            "TomTom reported an error: {}",
            error.description.as_deref().unwrap_or("no description")
        );
        return DirectionsResult::failed("ERROR", body);
    }

    let routes = parsed.routes.map(|routes| {
        routes
            .into_iter()
            .map(|route| DirectionsRoute {
                summary: route.summary.into(),
                legs: route.legs.map(|legs| {
                    legs.into_iter()
                        .map(|leg| Leg::new(leg.summary.length_in_meters, leg.summary.travel_time_in_seconds))
                        .collect()
                }),
            })
            .collect()
    });

    let optimized_order = parsed.optimized_waypoints.map(|waypoints| {
        waypoints
            .into_iter()
            .map(|wp| WaypointOrder {
                provided_index: wp.provided_index,
                optimized_index: wp.optimized_index,
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
impl DirectionsProvider for TomTomClient {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsResult> {
        let url = self.directions_url(request);
        debug!("Requesting TomTom route (optimize: {})", request.optimize);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to TomTom")?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read TomTom response body")?;

        Ok(parse_calculate_route(status, &body))
    }

    fn waypoint_separator(&self) -> &'static str {
        ":"
    }

    fn name(&self) -> &str {
        "TomTom"
    }
}

#[async_trait]
impl CoordinateResolver for TomTomClient {
    async fn resolve(&self, address: &str, district: &str, city: &str) -> Option<Coordinates> {
        if !has_search_terms(address, district, city) {
            return None;
        }

        match self.geocode(address, district, city).await {
            Ok(coords) => coords,
            Err(e) => {
                warn!("TomTom geocoding failed for '{}': {:#}", address, e);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "tomtom"
    }
}

// ==========================================================================
// TomTom API types
// ==========================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRouteResponse {
    routes: Option<Vec<TomTomRoute>>,
    optimized_waypoints: Option<Vec<TomTomOptimizedWaypoint>>,
    error: Option<TomTomError>,
}

#[derive(Debug, Deserialize)]
struct TomTomRoute {
    summary: TomTomSummary,
    legs: Option<Vec<TomTomLeg>>,
}

#[derive(Debug, Deserialize)]
struct TomTomLeg {
    summary: TomTomSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomSummary {
    length_in_meters: f64,
    travel_time_in_seconds: i64,
}

impl From<TomTomSummary> for RouteSummary {
    fn from(summary: TomTomSummary) -> Self {
        RouteSummary {
            distance_meters: summary.length_in_meters,
            duration_seconds: summary.travel_time_in_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomOptimizedWaypoint {
    provided_index: usize,
    optimized_index: usize,
}

#[derive(Debug, Deserialize)]
struct TomTomError {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    position: GeocodePosition,
    address: GeocodeAddress,
}

#[derive(Debug, Deserialize)]
struct GeocodePosition {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeAddress {
    municipality_subdivision: Option<String>,
    municipality: Option<String>,
}

impl GeocodeResponse {
    /// Position of the first result, only when it lies in the requested
    /// district and city.
    fn accepted_position(&self, district: &str, city: &str) -> Option<Coordinates> {
        let first = self.results.first()?;
        let same_district = first.address.municipality_subdivision.as_deref() == Some(district);
        let same_city = first.address.municipality.as_deref() == Some(city);

        if same_district && same_city {
            Some(Coordinates::new(first.position.lat, first.position.lon))
        } else {
            debug!(
                "TomTom match {:?}/{:?} outside {}/{}, rejecting",
                first.address.municipality_subdivision, first.address.municipality, district, city
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client() -> TomTomClient {
        TomTomClient::new(TomTomConfig::new("secret").with_base_url("http://tomtom.test")).unwrap()
    }

    fn request() -> DirectionsRequest {
        DirectionsRequest {
            origin: "-22.5,-43.2".into(),
            waypoints: "-22.4,-43.1:-22.3,-43.0".into(),
            destination: "-22.5,-43.2".into(),
            language: "pt-BR".into(),
            region: "br".into(),
            departure_time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0),
            ..Default::default()
        }
    }

    #[test]
    fn test_directions_url_fixed_order() {
        let url = client().directions_url(&request());

        assert!(url.starts_with(
            "http://tomtom.test/routing/1/calculateRoute/-22.5,-43.2:-22.4,-43.1:-22.3,-43.0:-22.5,-43.2/json?key=secret"
        ));
        assert!(url.contains("&traffic=true"));
        assert!(url.contains("&language=pt-BR"));
        assert!(url.contains("&departAt=2024-01-01T08%3A00%3A00.000000Z"));
        assert!(url.contains("&travelMode=car"));
        assert!(!url.contains("computeBestOrder"));
    }

    #[test]
    fn test_directions_url_optimized() {
        let mut req = request();
        req.optimize = true;
        req.travel_mode = Some("truck".into());
        let url = client().directions_url(&req);

        assert!(url.contains("&computeBestOrder=true&routeType=shortest"));
        assert!(url.contains("&travelMode=truck"));
    }

    #[test]
    fn test_directions_url_without_waypoints_or_departure() {
        let mut req = request();
        req.waypoints.clear();
        req.departure_time = None;
        let url = client().directions_url(&req);

        assert!(url.contains("/calculateRoute/-22.5,-43.2:-22.5,-43.2/json"));
        assert!(url.contains("&departAt=now"));
    }

    #[test]
    fn test_directions_url_repeats_supported_avoid() {
        let mut req = request();
        req.avoid = vec!["tollRoads".into(), "tolls".into(), "ferries".into()];
        let url = client().directions_url(&req);

        assert!(url.ends_with("&avoid=tollRoads&avoid=ferries"));
    }

    #[test]
    fn test_parse_calculate_route() {
        let body = r#"{
            "formatVersion": "0.0.12",
            "routes": [{
                "summary": {"lengthInMeters": 8000, "travelTimeInSeconds": 900},
                "legs": [
                    {"summary": {"lengthInMeters": 5000, "travelTimeInSeconds": 600}},
                    {"summary": {"lengthInMeters": 3000, "travelTimeInSeconds": 300}}
                ]
            }],
            "optimizedWaypoints": [{"providedIndex": 0, "optimizedIndex": 1}, {"providedIndex": 1, "optimizedIndex": 0}]
        }"#;

        let result = parse_calculate_route(200, body);

        assert!(result.status.is_success());
        let route = &result.routes.as_ref().unwrap()[0];
        assert_eq!(route.summary.distance_meters, 8000.0);
        assert_eq!(route.legs.as_ref().unwrap()[1], Leg::new(3000.0, 300));
        assert_eq!(
            result.optimized_order.unwrap()[0],
            WaypointOrder { provided_index: 0, optimized_index: 1 }
        );
        assert!(result.raw.unwrap().contains("formatVersion"));
    }

    #[test]
    fn test_parse_calculate_route_error_body() {
        let body = r#"{"formatVersion":"0.0.12","error":{"description":"Invalid location"}}"#;
        let result = parse_calculate_route(200, body);
        assert_eq!(result.status.as_str(), "ERROR");
        assert_eq!(result.raw.as_deref(), Some(body));
    }

    #[test]
    fn test_parse_calculate_route_http_failure() {
        let result = parse_calculate_route(403, "Developer Inactive");
        assert_eq!(result.status.as_str(), "403");
        assert!(result.routes.is_none());
    }

    #[test]
    fn test_parse_calculate_route_without_routes() {
        let result = parse_calculate_route(200, r#"{"formatVersion":"0.0.12"}"#);
        assert!(result.status.is_success());
        assert!(result.routes.is_none());
    }

    #[test]
    fn test_geocode_accepts_matching_district_and_city() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"results":[{
                "position":{"lat":-22.9,"lon":-43.1},
                "address":{"municipalitySubdivision":"Centro","municipality":"Niterói"}
            }]}"#,
        )
        .unwrap();

        assert_eq!(body.accepted_position("Centro", "Niterói"), Some(Coordinates::new(-22.9, -43.1)));
        assert_eq!(body.accepted_position("Icaraí", "Niterói"), None);
        assert_eq!(body.accepted_position("Centro", "Rio de Janeiro"), None);
    }

    #[test]
    fn test_geocode_without_results() {
        let body: GeocodeResponse = serde_json::from_str(r#"{"summary":{"numResults":0},"results":[]}"#).unwrap();
        assert_eq!(body.accepted_position("Centro", "Niterói"), None);
    }

    #[test]
    fn test_geocode_url_encodes_address() {
        let url = client().geocode_url(" Rua A, 10 Centro ");
        assert_eq!(url, "http://tomtom.test/search/2/geocode/Rua%20A%2C%2010%20Centro.json?key=secret");
    }

    #[tokio::test]
    #[ignore = "Requires TOMTOM_API_KEY and network access"]
    async fn test_live_route() {
        let key = std::env::var("TOMTOM_API_KEY").unwrap();
        let client = TomTomClient::new(TomTomConfig::new(key)).unwrap();
        let mut req = request();
        req.departure_time = None;

        let result = client.route(&req).await.unwrap();
        assert!(result.status.is_success());
    }
}
