use async_trait::async_trait;

use crate::error::Result;
use crate::types::GeoCoordinates;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Body of the page at `url`. Errors only once every retry is spent.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates for a free-text address; `None` when the lookup fails or finds nothing.
    async fn geocode(&self, address: &str) -> Option<GeoCoordinates>;
}

pub trait SentimentScorer: Send + Sync {
    /// Compound polarity of one sentence, in [-1, 1].
    fn compound(&self, sentence: &str) -> f64;
}
