//! Business logic services

pub mod geo;
pub mod geocoding;
pub mod itinerary;
pub mod planner;
pub mod routing;
pub mod validator;
pub mod waypoints;
