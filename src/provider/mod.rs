//! Map backends
//!
//! Both backends answer the same two questions (how do I get from A to B,
//! and what is near this point) behind the [`MapProvider`] trait so the
//! rest of the planner never branches on which one is active.

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinate, Place, PlaceCategory, Route, TravelMode};
use crate::selector::ProviderKind;

pub mod google;
pub mod osm;

#[cfg(test)]
pub(crate) mod testing;

pub use google::GoogleMapsProvider;
pub use osm::OpenStreetMapProvider;

#[async_trait]
pub trait MapProvider: Send + Sync {
    /// Which slot this backend fills
    fn kind(&self) -> ProviderKind;

    /// Human-readable backend name for logs and notices
    fn name(&self) -> &'static str;

    /// Load the backend's client SDK. Callers bound this with a timeout.
    async fn load(&self) -> Result<()>;

    /// Resolve a route between two free-text addresses
    async fn resolve_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Route>;

    /// Search one category of places around `center`. Implementations
    /// return the backend's results untruncated.
    async fn search_nearby(&self, center: Coordinate, category: PlaceCategory)
    -> Result<Vec<Place>>;
}
