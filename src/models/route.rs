//! Route model, travel modes and transport cost estimation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Coordinate;
use crate::TripSyncError;

/// Travel mode requested by the user
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelMode {
    #[default]
    Driving,
    Transit,
    Walking,
}

impl TravelMode {
    /// Mode parameter for the Google Directions service
    #[must_use]
    pub const fn google_mode(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Transit => "transit",
            Self::Walking => "walking",
        }
    }

    /// OSRM routing profile. OSRM has no transit profile, so transit is
    /// routed on the road network.
    #[must_use]
    pub const fn osrm_profile(self) -> &'static str {
        match self {
            Self::Driving | Self::Transit => "driving",
            Self::Walking => "foot",
        }
    }

    /// Estimated cost per kilometer in won
    #[must_use]
    pub const fn cost_per_km(self) -> u64 {
        match self {
            Self::Driving => 150,
            Self::Transit => 100,
            Self::Walking => 0,
        }
    }

    /// Estimate the transport cost for a distance in meters
    #[must_use]
    pub fn estimate_cost(self, distance_meters: u64) -> u64 {
        let distance_km = distance_meters as f64 / 1000.0;
        (distance_km * self.cost_per_km() as f64).round() as u64
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Driving => "DRIVING",
            Self::Transit => "TRANSIT",
            Self::Walking => "WALKING",
        };
        f.write_str(name)
    }
}

impl FromStr for TravelMode {
    type Err = TripSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRIVING" => Ok(Self::Driving),
            "TRANSIT" => Ok(Self::Transit),
            "WALKING" => Ok(Self::Walking),
            other => Err(TripSyncError::validation(format!(
                "Unknown travel mode '{other}'"
            ))),
        }
    }
}

/// A resolved route between two endpoints
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Route {
    /// Human-readable distance, e.g. "325 km"
    pub distance_text: String,
    /// Human-readable duration, e.g. "4 hours 2 mins"
    pub duration_text: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    /// Step-by-step instructions in travel order
    pub turn_instructions: Vec<String>,
    /// Route geometry, origin to destination
    pub path: Vec<Coordinate>,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl Route {
    /// Route distance in kilometers
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters as f64 / 1000.0
    }

    /// Route duration in whole minutes, rounded
    #[must_use]
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_seconds as f64 / 60.0).round() as u64
    }
}

/// Format a distance in meters the way map services display it
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format a duration in seconds the way map services display it
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds / 60.0).round() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    match (hours, minutes) {
        (0, m) => plural(m.max(1), "min"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "min")),
    }
}
