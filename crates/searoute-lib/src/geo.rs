//! Geographic coordinate helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// `[lon, lat]` ordering for GeoJSON consumers.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &GeoCoordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

/// Error returned when parsing a `LAT,LON` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCoordinateError(String);

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid coordinate '{}': expected LAT,LON", self.0)
    }
}

impl std::error::Error for ParseCoordinateError {}

impl FromStr for GeoCoordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseCoordinateError(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(err)?;
        let lat: f64 = lat.trim().parse().map_err(|_| err())?;
        let lon: f64 = lon.trim().parse().map_err(|_| err())?;
        let coord = GeoCoordinate::new(lat, lon);
        if !coord.is_valid() {
            return Err(err());
        }
        Ok(coord)
    }
}

/// Haversine great-circle distance between two coordinates in kilometres.
pub fn haversine_km(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Wrap `lon` into the half-open window `[west, west + 360)`.
pub fn normalize_lon(lon: f64, west: f64) -> f64 {
    let shifted = (lon - west).rem_euclid(360.0);
    west + shifted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_pairs() {
        let coord: GeoCoordinate = "51.5, -0.12".parse().unwrap();
        assert_eq!(coord, GeoCoordinate::new(51.5, -0.12));
        assert!("91,0".parse::<GeoCoordinate>().is_err());
        assert!("abc".parse::<GeoCoordinate>().is_err());
    }

    #[test]
    fn haversine_matches_known_distance() {
        // One degree of latitude is ~111.2 km.
        let d = haversine_km(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn haversine_wraps_antimeridian() {
        let d = haversine_km(
            GeoCoordinate::new(0.0, 179.5),
            GeoCoordinate::new(0.0, -179.5),
        );
        assert!(d < 112.0, "got {d}");
    }

    #[test]
    fn normalize_lon_wraps_into_window() {
        assert_eq!(normalize_lon(190.0, -180.0), -170.0);
        assert_eq!(normalize_lon(-180.0, -180.0), -180.0);
        assert_eq!(normalize_lon(180.0, -180.0), -180.0);
        assert_eq!(normalize_lon(10.0, 0.0), 10.0);
    }

    #[test]
    fn lon_lat_order_for_geojson() {
        assert_eq!(GeoCoordinate::new(1.0, 2.0).to_lon_lat(), [2.0, 1.0]);
    }
}
