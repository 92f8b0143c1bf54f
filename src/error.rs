//! Error types and handling for the `TripSync` planner

use thiserror::Error;

use crate::models::PlaceCategory;

/// Main error type for the `TripSync` planner
#[derive(Error, Debug)]
pub enum TripSyncError {
    /// Input validation errors (missing departure, destination or budget)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A geocoding lookup returned no match for the given text
    #[error("Address not found: {query}")]
    AddressNotFound { query: String },

    /// The routing backend answered but could not produce a route
    #[error("Route not found (status {status})")]
    RouteNotFound { status: String },

    /// A categorized nearby search failed
    #[error("Place search for {category} failed (status {status})")]
    PlacesSearch {
        category: PlaceCategory,
        status: String,
    },

    /// A map backend could not be loaded or is not active
    #[error("Map provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Local store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripSyncError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new address-not-found error
    pub fn address_not_found<S: Into<String>>(query: S) -> Self {
        Self::AddressNotFound {
            query: query.into(),
        }
    }

    /// Create a new route-not-found error
    pub fn route_not_found<S: Into<String>>(status: S) -> Self {
        Self::RouteNotFound {
            status: status.into(),
        }
    }

    /// Create a new provider-unavailable error
    pub fn provider_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::AddressNotFound { query } => {
                format!("Could not find '{query}'. Please check the address.")
            }
            Self::RouteNotFound { .. } => {
                "No route found. Please check the departure and destination.".to_string()
            }
            Self::PlacesSearch { category, .. } => {
                format!("Could not load nearby {category} places.")
            }
            Self::ProviderUnavailable { .. } => {
                "The map service is unavailable. Please try again later.".to_string()
            }
            Self::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            Self::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            Self::Storage { .. } => {
                "Local storage failed. You may need to clear the cache directory.".to_string()
            }
            Self::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TripSyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.to_string())
    }
}

impl From<anyhow::Error> for TripSyncError {
    fn from(err: anyhow::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = TripSyncError::validation("missing budget");
        assert!(matches!(validation_err, TripSyncError::Validation { .. }));

        let not_found = TripSyncError::address_not_found("Atlantis");
        assert!(matches!(not_found, TripSyncError::AddressNotFound { .. }));

        let route_err = TripSyncError::route_not_found("ZERO_RESULTS");
        assert!(matches!(route_err, TripSyncError::RouteNotFound { .. }));
    }

    #[test]
    fn test_address_not_found_is_distinct_from_routing_failure() {
        let not_found = TripSyncError::address_not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));
        assert_ne!(
            not_found.user_message(),
            TripSyncError::route_not_found("NOT_FOUND").user_message()
        );
    }

    #[test]
    fn test_user_messages() {
        let validation_err = TripSyncError::validation("Please enter a budget.");
        assert_eq!(validation_err.user_message(), "Please enter a budget.");

        let api_err = TripSyncError::api("test");
        assert!(api_err.user_message().contains("Unable to connect"));

        let places_err = TripSyncError::PlacesSearch {
            category: PlaceCategory::Restaurant,
            status: "OVER_QUERY_LIMIT".to_string(),
        };
        assert!(places_err.user_message().contains("restaurant"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let trip_err: TripSyncError = io_err.into();
        assert!(matches!(trip_err, TripSyncError::Io { .. }));
    }

    #[test]
    fn test_anyhow_conversion_is_storage() {
        let err: TripSyncError = anyhow::anyhow!("keyspace closed").into();
        assert!(matches!(err, TripSyncError::Storage { .. }));
    }
}
