//! Nearby place model and categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Coordinate;
use crate::TripSyncError;

/// Category of a recommended place
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Tourist,
    Restaurant,
    Accommodation,
}

impl PlaceCategory {
    /// All categories, in the order they are searched
    pub const ALL: [Self; 3] = [Self::Tourist, Self::Restaurant, Self::Accommodation];

    /// Place type used by the Google Places nearby search
    #[must_use]
    pub const fn google_type(self) -> &'static str {
        match self {
            Self::Tourist => "tourist_attraction",
            Self::Restaurant => "restaurant",
            Self::Accommodation => "lodging",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tourist => "tourist",
            Self::Restaurant => "restaurant",
            Self::Accommodation => "accommodation",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceCategory {
    type Err = TripSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tourist" => Ok(Self::Tourist),
            "restaurant" => Ok(Self::Restaurant),
            "accommodation" => Ok(Self::Accommodation),
            other => Err(TripSyncError::validation(format!(
                "Unknown place category '{other}'"
            ))),
        }
    }
}

/// Filter applied to the recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceFilter {
    #[default]
    All,
    Category(PlaceCategory),
}

impl PlaceFilter {
    #[must_use]
    pub fn matches(self, place: &Place) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => place.category == category,
        }
    }
}

impl FromStr for PlaceFilter {
    type Err = TripSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Category)
        }
    }
}

/// A point of interest near the destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub category: PlaceCategory,
    /// Rating from 0 to 5; 0 when the backend has none
    pub rating: f32,
    pub address: String,
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Price in won, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(category: PlaceCategory) -> Place {
        Place {
            name: "Test".to_string(),
            category,
            rating: 4.5,
            address: "Somewhere".to_string(),
            coordinate: Coordinate::new(0.0, 0.0),
            photo_url: None,
            price: None,
            price_label: None,
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<PlaceFilter>().unwrap(), PlaceFilter::All);
        assert_eq!(
            "Restaurant".parse::<PlaceFilter>().unwrap(),
            PlaceFilter::Category(PlaceCategory::Restaurant)
        );
        assert!("museum".parse::<PlaceFilter>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let hotel = place(PlaceCategory::Accommodation);
        assert!(PlaceFilter::All.matches(&hotel));
        assert!(PlaceFilter::Category(PlaceCategory::Accommodation).matches(&hotel));
        assert!(!PlaceFilter::Category(PlaceCategory::Tourist).matches(&hotel));
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&place(PlaceCategory::Tourist)).unwrap();
        assert!(json.contains("\"category\":\"tourist\""));
        assert!(!json.contains("photo_url"));
    }
}
