//! Address → coordinate resolution
//!
//! The core only depends on [`GeoLocationProvider`]. [`StaticGeocoder`] is a
//! table-backed implementation, loaded from `GEO_TABLE_FILE` and extendable at
//! runtime; addresses written as `lat,lon` resolve to themselves.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::GeoPoint;

use crate::utils::{AppError, AppResult};

#[async_trait]
pub trait GeoLocationProvider: Send + Sync + std::fmt::Debug {
    /// Coordinates for an address, `None` when it can not be located
    async fn resolve(&self, address: &str) -> Option<GeoPoint>;

    /// Distance between two points in kilometres
    fn distance_km(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        a.distance_km(b)
    }
}

#[derive(Debug, Default)]
pub struct StaticGeocoder {
    table: RwLock<HashMap<String, GeoPoint>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of `{"address": {"lat": .., "lon": ..}}`
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::internal(format!("read {}: {e}", path.display())))?;
        let entries: HashMap<String, GeoPoint> = serde_json::from_str(&raw)
            .map_err(|e| AppError::internal(format!("parse {}: {e}", path.display())))?;
        let geocoder = Self::new();
        for (address, point) in entries {
            geocoder.insert(&address, point);
        }
        tracing::info!(path = %path.display(), entries = geocoder.len(), "geo table loaded");
        Ok(geocoder)
    }

    pub fn insert(&self, address: &str, point: GeoPoint) {
        self.table.write().insert(normalize(address), point);
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

#[async_trait]
impl GeoLocationProvider for StaticGeocoder {
    async fn resolve(&self, address: &str) -> Option<GeoPoint> {
        if let Some(point) = parse_coordinates(address) {
            return Some(point);
        }
        self.table.read().get(&normalize(address)).copied()
    }
}

/// Case and whitespace insensitive lookup key
fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `"40.42,-86.92"` → point
fn parse_coordinates(address: &str) -> Option<GeoPoint> {
    let (lat, lon) = address.split_once(',')?;
    let point = GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    point.is_valid().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_table_lookup_is_normalized() {
        let geo = StaticGeocoder::new();
        geo.insert("100 State St,  West Lafayette", GeoPoint::new(40.42, -86.91));
        assert!(geo.resolve("100 state st, west lafayette").await.is_some());
        assert!(geo.resolve("nowhere").await.is_none());
    }

    #[tokio::test]
    async fn test_literal_coordinates() {
        let geo = StaticGeocoder::new();
        let p = geo.resolve("40.5, -86.9").await.unwrap();
        assert_eq!(p, GeoPoint::new(40.5, -86.9));
        assert!(geo.resolve("200, 10").await.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geo.json");
        std::fs::write(&path, r#"{"1 Main St": {"lat": 40.0, "lon": -86.0}}"#).unwrap();
        let geo = StaticGeocoder::from_file(&path).unwrap();
        assert_eq!(geo.len(), 1);
    }
}
