//! OpenStreetMap backend
//!
//! Free-text addresses are geocoded through Nominatim and routed through
//! OSRM, the same services the Leaflet routing control talks to. OSM has
//! no place search comparable to Google's, so nearby searches return a
//! fixed set of placeholder entries around the requested point.

use async_trait::async_trait;
use rand::RngExt;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::MapProvider;
use crate::cache::LocalStore;
use crate::config::OsmConfig;
use crate::models::{
    Coordinate, Place, PlaceCategory, Route, TravelMode, format_distance, format_duration,
};
use crate::selector::ProviderKind;
use crate::{Result, TripSyncError};

const OSRM_OK: &str = "Ok";

/// Secondary backend client
#[derive(Debug, Clone)]
pub struct OpenStreetMapProvider {
    client: Client,
    nominatim_url: String,
    osrm_url: String,
    client_id: String,
    geocode_cache: Option<(Arc<LocalStore>, Duration)>,
}

impl OpenStreetMapProvider {
    /// Create a new client
    pub fn new(config: &OsmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.client_id.clone())
            .build()?;

        Ok(Self {
            client,
            nominatim_url: config.nominatim_url.trim_end_matches('/').to_string(),
            osrm_url: config.osrm_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            geocode_cache: None,
        })
    }

    /// Cache geocoding hits in `store` for roughly `ttl`
    #[must_use]
    pub fn with_geocode_cache(mut self, store: Arc<LocalStore>, ttl: Duration) -> Self {
        self.geocode_cache = Some((store, ttl));
        self
    }

    /// Resolve free text to the first matching coordinate.
    /// An empty result set is [`TripSyncError::AddressNotFound`].
    #[instrument(skip(self))]
    pub async fn geocode(&self, query: &str) -> Result<Coordinate> {
        let key = format!("geocode:{}", query.trim().to_lowercase());

        if let Some((store, _)) = &self.geocode_cache {
            match store.get::<Coordinate>(&key).await {
                Ok(Some(cached)) => {
                    debug!("Geocoding cache hit for '{}'", query);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => warn!("Geocoding cache lookup failed: {}", e),
            }
        }

        let coordinate = self.geocode_call(query).await?;

        if let Some((store, ttl)) = &self.geocode_cache {
            let jitter: f32 = rand::rng().random_range(0.9..1.1);
            let ttl = ttl.mul_f32(jitter);
            if let Err(e) = store.put(&key, coordinate, ttl).await {
                warn!("Failed to cache geocoding result: {}", e);
            }
        }

        Ok(coordinate)
    }

    async fn geocode_call(&self, query: &str) -> Result<Coordinate> {
        debug!("Calling Nominatim for '{}'", query);
        let url = format!("{}/search", self.nominatim_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("email", self.client_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripSyncError::api(format!("Nominatim error {status}")));
        }

        let matches: Vec<api::NominatimMatch> = response.json().await?;
        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| TripSyncError::address_not_found(query))?;

        let coordinate = first.coordinate()?;
        debug!(
            "Geocoded '{}' to {} ({})",
            query,
            coordinate.format_coordinates(),
            first.display_name
        );
        Ok(coordinate)
    }

    async fn route_between(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Route> {
        let url = format!(
            "{}/route/v1/{}/{};{}",
            self.osrm_url,
            mode.osrm_profile(),
            origin.format_lon_lat(),
            destination.format_lon_lat()
        );
        debug!("OSRM request: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "true"),
            ])
            .send()
            .await?;

        // OSRM answers 400 with a JSON body for unroutable requests
        let status = response.status();
        if status.is_server_error() {
            return Err(TripSyncError::api(format!("OSRM error {status}")));
        }

        let body: api::OsrmResponse = response.json().await?;
        if body.code != OSRM_OK {
            warn!("OSRM returned {}", body.code);
            return Err(TripSyncError::route_not_found(body.code));
        }

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| TripSyncError::route_not_found("NoRoute"))?;

        Ok(route.into_route(origin, destination))
    }
}

#[async_trait]
impl MapProvider for OpenStreetMapProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fallback
    }

    fn name(&self) -> &'static str {
        "OpenStreetMap"
    }

    async fn load(&self) -> Result<()> {
        // Tiles and the routing control are rendered client-side
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Route> {
        let from = self.geocode(origin).await?;
        let to = self.geocode(destination).await?;
        let route = self.route_between(from, to, mode).await?;

        info!(
            "Resolved route {} -> {}: {} ({})",
            origin, destination, route.distance_text, route.duration_text
        );
        Ok(route)
    }

    async fn search_nearby(
        &self,
        center: Coordinate,
        category: PlaceCategory,
    ) -> Result<Vec<Place>> {
        Ok(placeholder_places(center, category))
    }
}

/// Synthesized entries for backends without place search
#[must_use]
pub fn placeholder_places(center: Coordinate, category: PlaceCategory) -> Vec<Place> {
    let entries: [(&str, (f64, f64), f32, u64, &str); 2] = match category {
        PlaceCategory::Tourist => [
            ("Local landmark", (0.005, 0.005), 4.5, 0, "Free"),
            ("City museum", (-0.004, 0.006), 4.3, 5_000, "₩"),
        ],
        PlaceCategory::Restaurant => [
            ("Local restaurant", (0.003, -0.004), 4.2, 15_000, "₩₩"),
            ("Street food market", (-0.006, -0.002), 4.4, 8_000, "₩"),
        ],
        PlaceCategory::Accommodation => [
            ("Central hotel", (0.002, 0.008), 4.1, 120_000, "₩₩₩"),
            ("Guesthouse", (-0.003, -0.007), 4.0, 60_000, "₩₩"),
        ],
    };

    entries
        .into_iter()
        .map(|(name, (dlat, dlon), rating, price, label)| {
            let coordinate = center.offset(dlat, dlon);
            Place {
                name: name.to_string(),
                category,
                rating,
                address: format!("Near {}", coordinate.format_coordinates()),
                coordinate,
                photo_url: None,
                price: Some(price),
                price_label: Some(label.to_string()),
            }
        })
        .collect()
}

fn step_instruction(step: &api::Step) -> String {
    let maneuver = &step.maneuver;
    let modifier = maneuver.modifier.as_deref().unwrap_or("");

    let action = match maneuver.kind.as_str() {
        "depart" => "Depart".to_string(),
        "arrive" => return "Arrive at your destination".to_string(),
        "turn" | "end of road" | "fork" | "on ramp" | "off ramp" => {
            format!("Turn {modifier}").trim_end().to_string()
        }
        "roundabout" | "rotary" | "roundabout turn" => "Enter the roundabout".to_string(),
        "merge" => "Merge".to_string(),
        _ => "Continue".to_string(),
    };

    if step.name.is_empty() {
        action
    } else {
        format!("{action} onto {}", step.name)
    }
}

/// Nominatim and OSRM response structures
mod api {
    use super::{
        Coordinate, Deserialize, Route, TripSyncError, format_distance, format_duration,
        step_instruction,
    };
    use crate::Result;

    #[derive(Debug, Deserialize)]
    pub struct NominatimMatch {
        pub lat: String,
        pub lon: String,
        #[serde(default)]
        pub display_name: String,
    }

    impl NominatimMatch {
        pub fn coordinate(&self) -> Result<Coordinate> {
            let parse = |value: &str| {
                value.parse::<f64>().map_err(|_| {
                    TripSyncError::api(format!("Invalid coordinate in geocoding result: {value}"))
                })
            };
            Ok(Coordinate::new(parse(&self.lat)?, parse(&self.lon)?))
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct OsrmResponse {
        pub code: String,
        #[serde(default)]
        pub routes: Vec<OsrmRoute>,
    }

    #[derive(Debug, Deserialize)]
    pub struct OsrmRoute {
        pub distance: f64,
        pub duration: f64,
        pub geometry: Option<Geometry>,
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        /// `[longitude, latitude]` pairs
        pub coordinates: Vec<[f64; 2]>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Leg {
        #[serde(default)]
        pub steps: Vec<Step>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Step {
        #[serde(default)]
        pub name: String,
        pub maneuver: Maneuver,
    }

    #[derive(Debug, Deserialize)]
    pub struct Maneuver {
        #[serde(rename = "type")]
        pub kind: String,
        pub modifier: Option<String>,
    }

    impl OsrmRoute {
        pub fn into_route(self, origin: Coordinate, destination: Coordinate) -> Route {
            let path = match self.geometry {
                Some(geometry) => geometry
                    .coordinates
                    .into_iter()
                    .map(|[lon, lat]| Coordinate::new(lat, lon))
                    .collect(),
                None => vec![origin, destination],
            };

            let turn_instructions = self
                .legs
                .iter()
                .flat_map(|leg| leg.steps.iter())
                .map(step_instruction)
                .collect();

            Route {
                distance_text: format_distance(self.distance),
                duration_text: format_duration(self.duration),
                distance_meters: self.distance.round() as u64,
                duration_seconds: self.duration.round() as u64,
                turn_instructions,
                path,
                origin,
                destination,
            }
        }
    }
}
