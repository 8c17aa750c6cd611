//! Coordinate resolution for stops that arrive without a position
//!
//! Resolvers never fail the itinerary: "not found" and transport errors both
//! come back as `None` and are logged.
//!
//! Configuration via GEOCODING_MODE env variable:
//! - "mock" → MockResolver (tests, development)
//! - "tomtom" → TomTom search API
//! - "google" → Google geocoding API
//! - "both" → TomTom first, Google when TomTom has no answer

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::Config;
use crate::services::routing::{GoogleClient, GoogleConfig, TomTomClient, TomTomConfig};
use crate::types::Coordinates;

/// Resolver trait - abstraction for all geocoding backends
#[async_trait]
pub trait CoordinateResolver: Send + Sync {
    /// Resolve a free-text address, constrained to the given district and city.
    /// Returns None if the address cannot be resolved.
    async fn resolve(&self, address: &str, district: &str, city: &str) -> Option<Coordinates>;

    /// Get the name of this resolver implementation
    fn name(&self) -> &'static str;
}

/// All three search terms must be present before any backend is queried.
pub fn has_search_terms(address: &str, district: &str, city: &str) -> bool {
    !address.trim().is_empty() && !district.trim().is_empty() && !city.trim().is_empty()
}

/// Which geocoding backend(s) to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeocodingMode {
    TomTom,
    Google,
    Both,
    #[default]
    Mock,
}

impl FromStr for GeocodingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tomtom" => Ok(GeocodingMode::TomTom),
            "google" => Ok(GeocodingMode::Google),
            "both" => Ok(GeocodingMode::Both),
            "mock" => Ok(GeocodingMode::Mock),
            other => anyhow::bail!("unknown geocoding mode '{}' (expected tomtom, google, both or mock)", other),
        }
    }
}

// ==========================================================================
// MockResolver
// ==========================================================================

/// Mock resolver for testing - returns deterministic fake coordinates
pub struct MockResolver;

impl MockResolver {
    pub fn new() -> Self {
        Self
    }

    /// Generate deterministic coordinates from the search terms.
    /// Coordinates land inside greater São Paulo.
    fn hash_to_coordinates(address: &str, district: &str, city: &str) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        district.hash(&mut hasher);
        city.hash(&mut hasher);
        let hash = hasher.finish();

        const LAT_MIN: f64 = -24.0;
        const LAT_MAX: f64 = -23.3;
        const LNG_MIN: f64 = -46.9;
        const LNG_MAX: f64 = -46.3;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFF_FFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + lat_normalized * (LAT_MAX - LAT_MIN),
            lng: LNG_MIN + lng_normalized * (LNG_MAX - LNG_MIN),
        }
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoordinateResolver for MockResolver {
    async fn resolve(&self, address: &str, district: &str, city: &str) -> Option<Coordinates> {
        if !has_search_terms(address, district, city) {
            return None;
        }
        Some(Self::hash_to_coordinates(address, district, city))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================================================
// FallbackResolver
// ==========================================================================

/// Ask `primary` first and fall back to `secondary` when it has no answer
pub struct FallbackResolver {
    primary: Arc<dyn CoordinateResolver>,
    secondary: Arc<dyn CoordinateResolver>,
}

impl FallbackResolver {
    pub fn new(primary: Arc<dyn CoordinateResolver>, secondary: Arc<dyn CoordinateResolver>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl CoordinateResolver for FallbackResolver {
    async fn resolve(&self, address: &str, district: &str, city: &str) -> Option<Coordinates> {
        if !has_search_terms(address, district, city) {
            return None;
        }

        if let Some(coords) = self.primary.resolve(address, district, city).await {
            return Some(coords);
        }

        debug!(
            "{} found nothing for '{}', trying {}",
            self.primary.name(),
            address,
            self.secondary.name()
        );
        self.secondary.resolve(address, district, city).await
    }

    fn name(&self) -> &'static str {
        "both"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create the resolver selected by `config.geocoding_mode`.
///
/// Fails when the selected backend's API key is missing.
pub fn create_resolver(config: &Config) -> Result<Arc<dyn CoordinateResolver>> {
    let resolver: Arc<dyn CoordinateResolver> = match config.geocoding_mode {
        GeocodingMode::Mock => Arc::new(MockResolver::new()),
        GeocodingMode::TomTom => Arc::new(tomtom_client(config)?),
        GeocodingMode::Google => Arc::new(google_client(config)?),
        GeocodingMode::Both => Arc::new(FallbackResolver::new(
            Arc::new(tomtom_client(config)?),
            Arc::new(google_client(config)?),
        )),
    };

    info!("Using {} coordinate resolver", resolver.name());
    Ok(resolver)
}

fn tomtom_client(config: &Config) -> Result<TomTomClient> {
    let api_key = config
        .tomtom_api_key
        .clone()
        .context("TOMTOM_API_KEY must be set to geocode with TomTom")?;
    TomTomClient::new(TomTomConfig::new(api_key).with_timeout(config.http_timeout_seconds))
}

fn google_client(config: &Config) -> Result<GoogleClient> {
    let api_key = config
        .google_maps_key
        .clone()
        .context("GOOGLE_MAPS_KEY must be set to geocode with Google")?;
    GoogleClient::new(GoogleConfig::new(api_key).with_timeout(config.http_timeout_seconds))
}
