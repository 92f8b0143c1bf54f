//! Data models for the TripSync planner
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and the default map center
//! - Route: travel modes, resolved routes and cost estimation
//! - Place: nearby places, categories and filters

pub mod location;
pub mod place;
pub mod route;

// Re-export all public types for convenient access
pub use location::{Coordinate, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use place::{Place, PlaceCategory, PlaceFilter};
pub use route::{Route, TravelMode, format_distance, format_duration};
