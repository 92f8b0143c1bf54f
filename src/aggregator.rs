//! Nearby place aggregation
//!
//! Fans out one search per category against the active backend and joins
//! on all of them before merging. A failing or empty category contributes
//! nothing; the aggregate itself never fails.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::models::{Coordinate, Place, PlaceCategory};
use crate::provider::MapProvider;

#[derive(Debug, Clone, Copy)]
pub struct PlaceAggregator {
    per_category_limit: usize,
}

impl Default for PlaceAggregator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl PlaceAggregator {
    #[must_use]
    pub fn new(per_category_limit: usize) -> Self {
        Self { per_category_limit }
    }

    /// Search every category around `center` and merge the results.
    pub async fn find_nearby(&self, provider: &dyn MapProvider, center: Coordinate) -> Vec<Place> {
        let searches = PlaceCategory::ALL.map(|category| async move {
            let result = provider.search_nearby(center, category).await;
            (category, result)
        });

        let mut places = Vec::new();
        for (category, result) in join_all(searches).await {
            match result {
                Ok(found) => {
                    debug!("{} search returned {} places", category, found.len());
                    places.extend(found.into_iter().take(self.per_category_limit));
                }
                Err(e) => warn!("{} search failed, skipping: {}", category, e),
            }
        }

        info!(
            "Collected {} nearby places from {}",
            places.len(),
            provider.name()
        );
        places
    }
}
