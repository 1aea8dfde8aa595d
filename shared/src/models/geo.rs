//! Geographic coordinates

use serde::{Deserialize, Serialize};

/// Mean earth radius used by the great-circle distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle (haversine) distance in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Point `km` kilometres due north (used to build fixtures)
    pub fn offset_north_km(&self, km: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (km / EARTH_RADIUS_KM).to_degrees(),
            lon: self.lon,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(40.4237, -86.9212);
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(40.4237, -86.9212);
        let b = GeoPoint::new(41.8781, -87.6298);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_offset_north_matches_distance() {
        let a = GeoPoint::new(40.0, -86.0);
        let b = a.offset_north_km(12.0);
        assert!((a.distance_km(&b) - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_known_distance() {
        // Indianapolis -> Chicago, roughly 265 km
        let indy = GeoPoint::new(39.7684, -86.1581);
        let chicago = GeoPoint::new(41.8781, -87.6298);
        let d = indy.distance_km(&chicago);
        assert!(d > 255.0 && d < 275.0, "unexpected distance {d}");
    }

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
