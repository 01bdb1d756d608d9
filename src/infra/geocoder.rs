use crate::app::ports::Geocoder;
use crate::config::GeoConfig;
use crate::error::{Result, ScraperError};
use crate::types::GeoCoordinates;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// One search hit as returned by Nominatim; coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Geocoder backed by the OpenStreetMap Nominatim search API.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    interval: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &GeoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.geocoder_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.geocoder_url.clone(),
            user_agent: config.geocoder_user_agent.clone(),
            interval: Duration::from_millis(config.geocoder_interval_ms),
        })
    }

    async fn lookup(&self, address: &str) -> Result<Option<GeoCoordinates>> {
        // The public instance enforces one request per second.
        tokio::time::sleep(self.interval).await;

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        places.first().map(parse_place).transpose()
    }
}

fn parse_place(place: &NominatimPlace) -> Result<GeoCoordinates> {
    let lat = place
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|e| ScraperError::Parse(format!("Invalid latitude '{}': {}", place.lat, e)))?;
    let lon = place
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|e| ScraperError::Parse(format!("Invalid longitude '{}': {}", place.lon, e)))?;
    Ok(GeoCoordinates { lat, lon })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Option<GeoCoordinates> {
        match self.lookup(address).await {
            Ok(Some(coords)) => {
                debug!("Geocoded '{}' to ({}, {})", address, coords.lat, coords.lon);
                Some(coords)
            }
            Ok(None) => {
                debug!("No geocoding result for '{}'", address);
                None
            }
            Err(e) => {
                warn!("Geocoding failed for address '{}': {}", address, e);
                None
            }
        }
    }
}
