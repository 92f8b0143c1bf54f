//! Google Maps web services backend
//!
//! Routes come from the Directions service and places from the Places
//! nearby search. Both report success through a `status` field where only
//! `"OK"` means an answer was produced.

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::MapProvider;
use crate::config::GoogleConfig;
use crate::models::{Coordinate, Place, PlaceCategory, Route, TravelMode};
use crate::selector::ProviderKind;
use crate::{Result, TripSyncError};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const PHOTO_MAX_WIDTH: u32 = 400;

/// Primary backend client
#[derive(Debug, Clone)]
pub struct GoogleMapsProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    search_radius_m: u32,
}

impl GoogleMapsProvider {
    /// Create a new client
    pub fn new(config: &GoogleConfig, search_radius_m: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TripSync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_radius_m,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| TripSyncError::provider_unavailable("Google Maps API key is not set"))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Google request: {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key()?)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => TripSyncError::provider_unavailable(format!(
                "Google Maps rejected the API key ({status})"
            )),
            _ => TripSyncError::api(format!("Google Maps error {status}: {body}")),
        })
    }

    fn photo_url(&self, reference: &str) -> Option<String> {
        let key = self.api_key.as_deref()?;
        Some(format!(
            "{}/maps/api/place/photo?maxwidth={}&photo_reference={}&key={}",
            self.base_url, PHOTO_MAX_WIDTH, reference, key
        ))
    }
}

#[async_trait]
impl MapProvider for GoogleMapsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Primary
    }

    fn name(&self) -> &'static str {
        "Google Maps"
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<()> {
        let start = Instant::now();
        self.get("/maps/api/js", &[("libraries", "places".to_string())])
            .await?;
        info!(
            "Google Maps SDK loaded in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Route> {
        let response = self
            .get(
                "/maps/api/directions/json",
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_string()),
                    ("mode", mode.google_mode().to_string()),
                    ("alternatives", "true".to_string()),
                ],
            )
            .await?;

        let directions: api::DirectionsResponse = response.json().await?;
        if directions.status != STATUS_OK {
            warn!("Directions request returned {}", directions.status);
            return Err(TripSyncError::route_not_found(directions.status));
        }

        let leg = directions
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
            .ok_or_else(|| TripSyncError::route_not_found("NO_LEGS"))?;

        let route = leg.into_route();
        info!(
            "Resolved route {} -> {}: {} ({})",
            origin, destination, route.distance_text, route.duration_text
        );
        Ok(route)
    }

    #[instrument(skip(self))]
    async fn search_nearby(
        &self,
        center: Coordinate,
        category: PlaceCategory,
    ) -> Result<Vec<Place>> {
        let response = self
            .get(
                "/maps/api/place/nearbysearch/json",
                &[
                    ("location", center.format_lat_lng()),
                    ("radius", self.search_radius_m.to_string()),
                    ("type", category.google_type().to_string()),
                ],
            )
            .await?;

        let nearby: api::NearbySearchResponse = response.json().await?;
        match nearby.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => return Ok(Vec::new()),
            _ => {
                return Err(TripSyncError::PlacesSearch {
                    category,
                    status: nearby.status,
                });
            }
        }

        let places: Vec<Place> = nearby
            .results
            .into_iter()
            .map(|result| {
                let photo_url = result
                    .photos
                    .first()
                    .and_then(|photo| self.photo_url(&photo.photo_reference));
                result.into_place(category, photo_url)
            })
            .collect();

        debug!("Found {} {} places", places.len(), category);
        Ok(places)
    }
}

/// Strip the markup Google puts into step instructions
fn strip_html(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => {
                in_tag = true;
                plain.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Google web service response structures
mod api {
    use super::{Coordinate, Place, PlaceCategory, Route, strip_html};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }

    impl From<LatLng> for Coordinate {
        fn from(value: LatLng) -> Self {
            Coordinate::new(value.lat, value.lng)
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct TextValue {
        pub text: String,
        pub value: u64,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionsResponse {
        pub status: String,
        #[serde(default)]
        pub routes: Vec<DirectionsRoute>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionsRoute {
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Leg {
        pub distance: TextValue,
        pub duration: TextValue,
        pub start_location: LatLng,
        pub end_location: LatLng,
        #[serde(default)]
        pub steps: Vec<Step>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Step {
        #[serde(default)]
        pub html_instructions: String,
        pub end_location: LatLng,
    }

    impl Leg {
        pub fn into_route(self) -> Route {
            let origin: Coordinate = self.start_location.into();
            let destination: Coordinate = self.end_location.into();

            let mut path = vec![origin];
            let mut turn_instructions = Vec::with_capacity(self.steps.len());
            for step in self.steps {
                turn_instructions.push(strip_html(&step.html_instructions));
                path.push(step.end_location.into());
            }
            if path.last() != Some(&destination) {
                path.push(destination);
            }

            Route {
                distance_text: self.distance.text,
                duration_text: self.duration.text,
                distance_meters: self.distance.value,
                duration_seconds: self.duration.value,
                turn_instructions,
                path,
                origin,
                destination,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct NearbySearchResponse {
        pub status: String,
        #[serde(default)]
        pub results: Vec<PlaceResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct Photo {
        pub photo_reference: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceResult {
        pub name: String,
        pub rating: Option<f32>,
        pub vicinity: Option<String>,
        pub geometry: Geometry,
        #[serde(default)]
        pub photos: Vec<Photo>,
        pub price_level: Option<u8>,
    }

    impl PlaceResult {
        pub fn into_place(self, category: PlaceCategory, photo_url: Option<String>) -> Place {
            Place {
                name: self.name,
                category,
                rating: self.rating.unwrap_or(0.0),
                address: self.vicinity.unwrap_or_default(),
                coordinate: self.geometry.location.into(),
                photo_url,
                price: None,
                price_label: self
                    .price_level
                    .filter(|level| *level > 0)
                    .map(|level| "₩".repeat(usize::from(level))),
            }
        }
    }
}
