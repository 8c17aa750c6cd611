//! Configuration management

use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::defaults::{DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_LANGUAGE, DEFAULT_REGION};
use crate::services::geocoding::GeocodingMode;
use crate::services::routing::ProviderKind;
use crate::services::waypoints::UnresolvedPolicy;
use crate::types::timing::parse_clock_duration;
use crate::types::TimingConfiguration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directions provider backend
    pub routing_provider: ProviderKind,

    /// Coordinate resolver backend
    pub geocoding_mode: GeocodingMode,

    pub tomtom_api_key: Option<String>,

    pub google_maps_key: Option<String>,

    /// Service durations and return-to-base policy
    pub timing: TimingConfiguration,

    pub language: String,

    pub region: String,

    /// Road restrictions requested from the provider
    pub avoid: Vec<String>,

    pub http_timeout_seconds: u64,

    pub unresolved_policy: UnresolvedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing_provider: ProviderKind::default(),
            geocoding_mode: GeocodingMode::default(),
            tomtom_api_key: None,
            google_maps_key: None,
            timing: TimingConfiguration::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            region: DEFAULT_REGION.to_string(),
            avoid: Vec::new(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            unresolved_policy: UnresolvedPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let routing_provider = match get("ROUTING_PROVIDER") {
            Some(v) => v.parse().context("Invalid ROUTING_PROVIDER")?,
            None => defaults.routing_provider,
        };

        let geocoding_mode = match get("GEOCODING_MODE") {
            Some(v) => v.parse().context("Invalid GEOCODING_MODE")?,
            None => defaults.geocoding_mode,
        };

        let collect_service = clock_duration(get("ROUTE_TIME_CHARGE"), "ROUTE_TIME_CHARGE")?;
        let delivery_service = clock_duration(get("ROUTE_TIME_DISCHARGE"), "ROUTE_TIME_DISCHARGE")?;
        let return_to_base = match get("ROUTE_RETURN_BASE") {
            Some(v) => parse_bool(&v).with_context(|| format!("Invalid ROUTE_RETURN_BASE '{}'", v))?,
            None => false,
        };

        let avoid = get("ROUTING_AVOID")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let http_timeout_seconds = match get("HTTP_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid HTTP_TIMEOUT_SECONDS '{}'", v))?,
            None => defaults.http_timeout_seconds,
        };

        let unresolved_policy = match get("UNRESOLVED_POLICY") {
            Some(v) => v.parse().context("Invalid UNRESOLVED_POLICY")?,
            None => defaults.unresolved_policy,
        };

        Ok(Self {
            routing_provider,
            geocoding_mode,
            tomtom_api_key: get("TOMTOM_API_KEY"),
            google_maps_key: get("GOOGLE_MAPS_KEY"),
            timing: TimingConfiguration::new(collect_service, delivery_service, return_to_base),
            language: get("ROUTING_LANGUAGE").unwrap_or(defaults.language),
            region: get("ROUTING_REGION").unwrap_or(defaults.region),
            avoid,
            http_timeout_seconds,
            unresolved_policy,
        })
    }
}

fn clock_duration(value: Option<String>, key: &str) -> Result<TimeDelta> {
    match value {
        Some(v) => parse_clock_duration(&v).with_context(|| format!("{} must be HH:MM:SS, got '{}'", key, v)),
        None => Ok(TimeDelta::zero()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
