//! Coordinate parsing and great-circle distance.
//!
//! Issues carry their location as a `"lat,lng"` string. Everything that needs
//! a distance goes through [`parse_coordinate`] first.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::LuminosError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Haversine great-circle distance between two lat/lng points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Parse a two-part `"lat,lng"` string.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, LuminosError> {
    let invalid = |reason: &str| LuminosError::InvalidCoordinate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(invalid("expected exactly two comma-separated parts"));
    };

    let lat: f64 = lat.parse().map_err(|_| invalid("latitude is not a number"))?;
    let lng: f64 = lng.parse().map_err(|_| invalid("longitude is not a number"))?;

    if !lat.is_finite() || !lng.is_finite() {
        return Err(invalid("non-finite value"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid("latitude out of range"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(invalid("longitude out of range"));
    }

    Ok(Coordinate { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pair() {
        let c = parse_coordinate("12.9716,77.5946").unwrap();
        assert_eq!(c.lat, 12.9716);
        assert_eq!(c.lng, 77.5946);
    }

    #[test]
    fn parses_with_whitespace() {
        let c = parse_coordinate("  -33.8688 , 151.2093 ").unwrap();
        assert_eq!(c.lat, -33.8688);
        assert_eq!(c.lng, 151.2093);
    }

    #[test]
    fn rejects_single_part() {
        assert!(parse_coordinate("12.97").is_err());
    }

    #[test]
    fn rejects_three_parts() {
        assert!(parse_coordinate("1,2,3").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_coordinate("north,east").is_err());
        assert!(parse_coordinate("").is_err());
        assert!(parse_coordinate(",").is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_coordinate("91,0").is_err());
        assert!(parse_coordinate("0,-180.5").is_err());
        assert!(parse_coordinate("NaN,0").is_err());
        assert!(parse_coordinate("inf,0").is_err());
    }

    #[test]
    fn accepts_boundaries() {
        assert!(parse_coordinate("90,180").is_ok());
        assert!(parse_coordinate("-90,-180").is_ok());
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(12.97, 77.59, 12.97, 77.59).abs() < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Bengaluru to Chennai is roughly 290 km as the crow flies.
        let d = haversine_km(12.9716, 77.5946, 13.0827, 80.2707);
        assert!((d - 290.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn haversine_small_offset_in_meters() {
        // 0.001 degrees of latitude is ~111 m.
        let d = haversine_km(12.0, 77.0, 12.001, 77.0);
        assert!((d - 0.111).abs() < 0.002, "got {d}");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let c = Coordinate { lat: 1.5, lng: -2.25 };
        assert_eq!(parse_coordinate(&c.to_string()).unwrap(), c);
    }
}
