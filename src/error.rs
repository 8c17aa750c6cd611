//! Errors surfaced by the itinerary engine

use thiserror::Error;

use crate::types::DirectionsResult;

/// Why an itinerary could not be computed.
///
/// Validation and provider contract violations abort the whole call; no
/// partial itinerary is returned.
#[derive(Debug, Error)]
pub enum ItineraryError {
    /// Start point missing, or missing its identity or coordinates.
    #[error("invalid route structure: {0}")]
    InvalidRouteStructure(String),

    #[error("the number of stops must be at least 1")]
    InsufficientStops,

    /// Provider answered with a non-success status or left out required fields.
    #[error("routing provider error (status {status}): {message}")]
    ProviderRouting {
        status: String,
        message: String,
        /// Raw provider body
        payload: Option<String>,
    },

    /// Only raised under [`crate::services::planner::UnresolvedPolicy::Fail`].
    #[error("could not resolve coordinates for stop {stop_id}")]
    CoordinateResolution { stop_id: String },

    /// The provider call itself failed (transport, timeout).
    #[error("routing provider request failed: {0}")]
    Provider(#[source] anyhow::Error),
}

impl ItineraryError {
    pub(crate) fn provider_routing(result: &DirectionsResult, message: impl Into<String>) -> Self {
        ItineraryError::ProviderRouting {
            status: result.status.as_str().to_string(),
            message: message.into(),
            payload: result.raw.clone(),
        }
    }
}

pub type ItineraryResult<T> = std::result::Result<T, ItineraryError>;
