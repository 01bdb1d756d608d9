use serde::{Deserialize, Serialize};

use crate::types::GeoCoordinates;

/// Latitude/longitude rectangle used as a region-membership test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Edges count as inside.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    pub fn contains_point(&self, coords: &GeoCoordinates) -> bool {
        self.contains(coords.lat, coords.lon)
    }
}
