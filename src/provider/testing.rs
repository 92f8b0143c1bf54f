//! In-memory backend for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::MapProvider;
use crate::models::{Coordinate, Place, PlaceCategory, Route, TravelMode};
use crate::selector::ProviderKind;
use crate::{Result, TripSyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    Ok,
    Fail,
    Hang,
}

#[derive(Debug)]
pub struct FakeProvider {
    kind: ProviderKind,
    load: LoadBehavior,
    route: Option<Route>,
    unknown_address: Option<String>,
    places_per_category: usize,
    failing_category: Option<PlaceCategory>,
    load_calls: AtomicUsize,
    completed_searches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            load: LoadBehavior::Ok,
            route: Some(sample_route(10_000)),
            unknown_address: None,
            places_per_category: 3,
            failing_category: None,
            load_calls: AtomicUsize::new(0),
            completed_searches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_load(mut self, load: LoadBehavior) -> Self {
        self.load = load;
        self
    }

    pub fn with_route(mut self, route: Option<Route>) -> Self {
        self.route = route;
        self
    }

    pub fn with_unknown_address(mut self, address: &str) -> Self {
        self.unknown_address = Some(address.to_string());
        self
    }

    pub fn with_places_per_category(mut self, count: usize) -> Self {
        self.places_per_category = count;
        self
    }

    pub fn with_failing_category(mut self, category: PlaceCategory) -> Self {
        self.failing_category = Some(category);
        self
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn completed_searches(&self) -> usize {
        self.completed_searches.load(Ordering::SeqCst)
    }

    /// Most searches that were running at the same moment
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

pub fn sample_route(distance_meters: u64) -> Route {
    let origin = Coordinate::new(37.5665, 126.978);
    let destination = Coordinate::new(37.4563, 126.7052);
    Route {
        distance_text: format!("{:.1} km", distance_meters as f64 / 1000.0),
        duration_text: "25 mins".to_string(),
        distance_meters,
        duration_seconds: 1500,
        turn_instructions: vec!["Head west".to_string()],
        path: vec![origin, destination],
        origin,
        destination,
    }
}

pub fn sample_place(category: PlaceCategory, index: usize) -> Place {
    Place {
        name: format!("{category} {index}"),
        category,
        rating: 4.0,
        address: format!("{index} Test street"),
        coordinate: Coordinate::new(37.45, 126.70),
        photo_url: None,
        price: None,
        price_label: None,
    }
}

#[async_trait]
impl MapProvider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        match self.kind {
            ProviderKind::Primary => "Fake primary",
            ProviderKind::Fallback => "Fake fallback",
        }
    }

    async fn load(&self) -> Result<()> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        match self.load {
            LoadBehavior::Ok => Ok(()),
            LoadBehavior::Fail => Err(TripSyncError::provider_unavailable("fake load failure")),
            LoadBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }

    async fn resolve_route(
        &self,
        origin: &str,
        destination: &str,
        _mode: TravelMode,
    ) -> Result<Route> {
        if let Some(unknown) = &self.unknown_address {
            if origin == unknown || destination == unknown {
                return Err(TripSyncError::address_not_found(unknown.clone()));
            }
        }
        self.route
            .clone()
            .ok_or_else(|| TripSyncError::route_not_found("ZERO_RESULTS"))
    }

    async fn search_nearby(
        &self,
        _center: Coordinate,
        category: PlaceCategory,
    ) -> Result<Vec<Place>> {
        // Stagger completion so categories finish out of order
        let delay = match category {
            PlaceCategory::Tourist => 30,
            PlaceCategory::Restaurant => 10,
            PlaceCategory::Accommodation => 20,
        };
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed_searches.fetch_add(1, Ordering::SeqCst);

        if self.failing_category == Some(category) {
            return Err(TripSyncError::PlacesSearch {
                category,
                status: "UNKNOWN_ERROR".to_string(),
            });
        }

        Ok((0..self.places_per_category)
            .map(|i| sample_place(category, i))
            .collect())
    }
}
