//! Configuration management for the `TripSync` planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripSyncError;
use crate::models::{Coordinate, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::selector::ProviderKind;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripSyncConfig {
    /// Primary backend (Google Maps web services)
    #[serde(default)]
    pub google: GoogleConfig,
    /// Secondary backend (Nominatim + OSRM)
    #[serde(default)]
    pub osm: OsmConfig,
    /// Map view defaults
    #[serde(default)]
    pub map: MapConfig,
    /// Nearby place search
    #[serde(default)]
    pub places: PlacesConfig,
    /// Local store
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
    /// Payment simulation
    #[serde(default)]
    pub payment: PaymentConfig,
}

/// Google Maps web service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key; without one the primary backend never loads
    pub api_key: Option<String>,
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u32,
    /// How long the SDK may take to load before falling back
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

/// OpenStreetMap backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmConfig {
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_osrm_url")]
    pub osrm_url: String,
    /// Identifier sent with every geocoding request
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u32,
}

/// Map view defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// DOM element id the map is bound to
    #[serde(default = "default_map_anchor")]
    pub anchor: String,
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Provider selected at startup
    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,
}

/// Nearby place search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Search radius in meters
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    /// Maximum results kept per category
    #[serde(default = "default_per_category_limit")]
    pub per_category_limit: usize,
}

/// Local store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Geocoding cache TTL in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the static page
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Payment simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Probability that a simulated payment succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

// Default value functions
fn default_google_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_request_timeout() -> u32 {
    30
}

fn default_load_timeout_ms() -> u64 {
    5000
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_osrm_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_client_id() -> String {
    format!("TripSync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_map_anchor() -> String {
    "map".to_string()
}

fn default_center_latitude() -> f64 {
    DEFAULT_CENTER.latitude
}

fn default_center_longitude() -> f64 {
    DEFAULT_CENTER.longitude
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_provider() -> ProviderKind {
    ProviderKind::Primary
}

fn default_search_radius() -> u32 {
    5000
}

fn default_per_category_limit() -> usize {
    5
}

fn default_cache_location() -> String {
    "~/.cache/tripsync".to_string()
}

fn default_geocode_ttl() -> u32 {
    168
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

fn default_success_rate() -> f64 {
    0.9
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_base_url(),
            timeout_seconds: default_request_timeout(),
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl Default for OsmConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            osrm_url: default_osrm_url(),
            client_id: default_client_id(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            anchor: default_map_anchor(),
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            zoom: default_zoom(),
            default_provider: default_provider(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            search_radius_m: default_search_radius(),
            per_category_limit: default_per_category_limit(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            geocode_ttl_hours: default_geocode_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
        }
    }
}

impl MapConfig {
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_latitude, self.center_longitude)
    }
}

impl GoogleConfig {
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl CacheConfig {
    /// Store directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.location)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl TripSyncConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPSYNC__GOOGLE__API_KEY and friends
        builder = builder.add_source(
            Environment::with_prefix("TRIPSYNC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripSyncConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripsync").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.google.base_url.is_empty() {
            self.google.base_url = default_google_base_url();
        }
        if self.google.timeout_seconds == 0 {
            self.google.timeout_seconds = default_request_timeout();
        }
        if self.google.load_timeout_ms == 0 {
            self.google.load_timeout_ms = default_load_timeout_ms();
        }
        if self.osm.nominatim_url.is_empty() {
            self.osm.nominatim_url = default_nominatim_url();
        }
        if self.osm.osrm_url.is_empty() {
            self.osm.osrm_url = default_osrm_url();
        }
        if self.osm.client_id.is_empty() {
            self.osm.client_id = default_client_id();
        }
        if self.osm.timeout_seconds == 0 {
            self.osm.timeout_seconds = default_request_timeout();
        }
        if self.map.anchor.is_empty() {
            self.map.anchor = default_map_anchor();
        }
        if self.places.search_radius_m == 0 {
            self.places.search_radius_m = default_search_radius();
        }
        if self.places.per_category_limit == 0 {
            self.places.per_category_limit = default_per_category_limit();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.google.api_key {
            if api_key.trim().is_empty() {
                return Err(TripSyncError::config(
                    "Google API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if self.osm.client_id.trim().is_empty() {
            return Err(TripSyncError::config(
                "OSM client identifier is required by the Nominatim usage policy",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.google.timeout_seconds > 300 || self.osm.timeout_seconds > 300 {
            return Err(TripSyncError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.google.load_timeout_ms > 60_000 {
            return Err(
                TripSyncError::config("Map SDK load timeout cannot exceed 60000 ms").into(),
            );
        }

        if !(-90.0..=90.0).contains(&self.map.center_latitude)
            || !(-180.0..=180.0).contains(&self.map.center_longitude)
        {
            return Err(TripSyncError::config("Map center is not a valid coordinate").into());
        }

        if self.map.zoom > 21 {
            return Err(TripSyncError::config("Map zoom cannot exceed 21").into());
        }

        if self.places.search_radius_m > 50_000 {
            return Err(TripSyncError::config("Search radius cannot exceed 50000 m").into());
        }

        if self.places.per_category_limit > 20 {
            return Err(
                TripSyncError::config("Per-category place limit cannot exceed 20").into(),
            );
        }

        if !(0.0..=1.0).contains(&self.payment.success_rate) {
            return Err(
                TripSyncError::config("Payment success rate must be between 0 and 1").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripSyncError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripSyncError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Google", &self.google.base_url),
            ("Nominatim", &self.osm.nominatim_url),
            ("OSRM", &self.osm.osrm_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripSyncError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
