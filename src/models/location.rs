//! Coordinate model for geographic positions

use serde::{Deserialize, Serialize};

/// Default map center (Seoul City Hall)
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 37.5665,
    longitude: 126.9780,
};

/// Default map zoom level
pub const DEFAULT_ZOOM: u8 = 12;

/// A point on the map in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shift the coordinate by the given latitude/longitude deltas
    #[must_use]
    pub fn offset(&self, delta_lat: f64, delta_lon: f64) -> Self {
        Self::new(self.latitude + delta_lat, self.longitude + delta_lon)
    }

    /// Format as "lat,lon" the way Google web services expect it
    #[must_use]
    pub fn format_lat_lng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Format as "lon,lat" the way OSRM expects a waypoint
    #[must_use]
    pub fn format_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    /// Format coordinates for display
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_formats() {
        let coordinate = Coordinate::new(37.5665, 126.978);
        assert_eq!(coordinate.format_lat_lng(), "37.5665,126.978");
        assert_eq!(coordinate.format_lon_lat(), "126.978,37.5665");
    }

    #[test]
    fn test_offset() {
        let shifted = Coordinate::new(10.0, 20.0).offset(0.5, -0.25);
        assert_eq!(shifted, Coordinate::new(10.5, 19.75));
    }

    #[test]
    fn test_format_coordinates() {
        let coordinate = Coordinate::new(46.818_234, 8.227_456);
        assert_eq!(coordinate.format_coordinates(), "46.8182, 8.2275");
    }
}
