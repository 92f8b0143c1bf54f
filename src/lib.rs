//! `TripSync` - travel planning over interchangeable map backends
//!
//! Resolves a route between two addresses, gathers nearby places around
//! the destination, splits a budget across spending categories and
//! simulates checkout. Google Maps is the primary backend with
//! OpenStreetMap (Nominatim + OSRM) as the fallback.

pub mod aggregator;
pub mod api;
pub mod budget;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod payment;
pub mod provider;
pub mod selector;
pub mod session;
pub mod summary;
pub mod web;

// Re-export core types for public API
pub use aggregator::PlaceAggregator;
pub use budget::{BudgetBreakdown, BudgetPlan, BudgetWeights};
pub use cache::LocalStore;
pub use config::TripSyncConfig;
pub use error::TripSyncError;
pub use models::{Coordinate, Place, PlaceCategory, PlaceFilter, Route, TravelMode};
pub use notice::{Notice, NoticeLevel};
pub use payment::{PaymentRecord, PaymentSimulator};
pub use provider::{GoogleMapsProvider, MapProvider, OpenStreetMapProvider};
pub use selector::{MapView, ProviderKind, ProviderSelector};
pub use session::{PlannerSession, SearchPhase, TripRequest};
pub use summary::TripSummary;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
