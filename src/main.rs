//! Itinerary Worker - timing and sequencing for delivery/collection routes
//!
//! Reads a route, asks a directions provider for legs and prints the route
//! with arrival/exit times, per-leg data and totals.

mod cli;
mod config;
mod defaults;
mod error;
mod services;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::services::geo::distance_between_coords;
use crate::services::planner::ItineraryPlanner;
use crate::types::Route;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "itinerary.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - stderr keeps stdout clean for JSON output, plus file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,itinerary_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    match cli.command {
        Command::Plan { route, departure, optimize } => {
            let config = config::Config::from_env()?;
            info!("Configuration loaded");

            let text = std::fs::read_to_string(&route)
                .with_context(|| format!("Failed to read route file {}", route.display()))?;
            let parsed: Route = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse route file {}", route.display()))?;

            let planner = ItineraryPlanner::from_config(&config)?;
            let planned = if optimize {
                planner.plan_optimized(parsed, departure).await
            } else {
                planner.plan(parsed, departure).await
            };

            match planned {
                Ok(planned) => println!("{}", serde_json::to_string_pretty(&planned)?),
                Err(e) => {
                    error!("Planning failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Distance { lat1, lon1, lat2, lon2 } => {
            println!("{:.3}", distance_between_coords(lat1, lon1, lat2, lon2));
        }
    }

    Ok(())
}
