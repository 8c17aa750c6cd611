//! CLI argument parsing for the itinerary-worker binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "itinerary-worker", about = "Itinerary timing and sequencing worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Time a route read from a JSON file and print the result
    Plan {
        /// Route JSON file (start point and stops)
        #[arg(long)]
        route: PathBuf,
        /// Departure time, e.g. 2024-01-01T08:00:00 (UTC)
        #[arg(long, value_parser = parse_departure)]
        departure: NaiveDateTime,
        /// Let the provider reorder the stops
        #[arg(long)]
        optimize: bool,
    },
    /// Print the estimated road distance in km between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

/// Accepts naive `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`, or RFC 3339
/// (converted to UTC).
pub fn parse_departure(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .with_context(|| format!("unrecognized departure time '{}'", value))
}
