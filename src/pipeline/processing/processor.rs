use chrono::Utc;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::Geocoder;
use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::fuzzy;
use crate::pipeline::processing::geo::BoundingBox;
use crate::pipeline::processing::taxonomy::classify_specialty;
use crate::types::{AddressInfo, GeoCoordinates, ProcessedRecord, RawRecord};

/// Why a location check rejected a record
#[derive(Debug, Clone, PartialEq)]
pub enum LocationVerdict {
    /// Inside the region; coordinates are absent when geocoding found nothing
    Accepted(Option<GeoCoordinates>),
    CityNotMentioned,
    OutsideRegion(GeoCoordinates),
}

/// Settings the processor needs, lifted out of [`Config`]
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub city: String,
    pub bounding_box: BoundingBox,
    pub canonical_clinics: Vec<String>,
    pub fuzzy_threshold: u8,
    pub pincode_prefix: String,
}

impl From<&Config> for ProcessorSettings {
    fn from(config: &Config) -> Self {
        Self {
            city: config.target.city.clone(),
            bounding_box: config.geo.bounding_box,
            canonical_clinics: config.matching.canonical_clinics.clone(),
            fuzzy_threshold: config.matching.fuzzy_threshold,
            pincode_prefix: config.geo.pincode_prefix.clone(),
        }
    }
}

/// Turns raw records into processed ones, dropping anything that cannot be
/// placed inside the configured region.
pub struct DataProcessor {
    settings: ProcessorSettings,
    pincode: Regex,
    geocoder: Arc<dyn Geocoder>,
}

impl DataProcessor {
    pub fn new(settings: ProcessorSettings, geocoder: Arc<dyn Geocoder>) -> Result<Self> {
        if !settings.pincode_prefix.chars().all(|c| c.is_ascii_digit()) || settings.pincode_prefix.len() > 6 {
            return Err(ScraperError::Config(format!(
                "pincode prefix '{}' must be at most 6 digits",
                settings.pincode_prefix
            )));
        }
        let remaining = 6 - settings.pincode_prefix.len();
        let pincode = Regex::new(&format!(r"\b({}\d{{{}}})\b", settings.pincode_prefix, remaining))
            .map_err(|e| ScraperError::Config(format!("pincode pattern: {}", e)))?;

        Ok(Self {
            settings,
            pincode,
            geocoder,
        })
    }

    /// Split a raw address into full address, locality and pincode.
    ///
    /// Locality is the second-to-last comma-separated part, which on these
    /// sites sits just before the city.
    pub fn parse_address(&self, raw: Option<&str>) -> Option<AddressInfo> {
        let raw = raw.filter(|a| !a.trim().is_empty())?;

        let pincode = self
            .pincode
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let parts: Vec<&str> = raw.split(',').collect();
        let locality = if parts.len() > 1 {
            parts[parts.len() - 2].trim()
        } else {
            parts[0].trim()
        };

        Some(AddressInfo {
            full_address: raw.split_whitespace().collect::<Vec<_>>().join(" "),
            locality: locality.split_whitespace().collect::<Vec<_>>().join(" "),
            pincode,
        })
    }

    pub async fn validate_location(&self, address: &str) -> LocationVerdict {
        if !address.to_lowercase().contains(&self.settings.city.to_lowercase()) {
            return LocationVerdict::CityNotMentioned;
        }

        match self.geocoder.geocode(address).await {
            Some(coords) if self.settings.bounding_box.contains_point(&coords) => {
                LocationVerdict::Accepted(Some(coords))
            }
            Some(coords) => LocationVerdict::OutsideRegion(coords),
            // The city is named in the address, so an unresolvable address is given the benefit of the doubt.
            None => LocationVerdict::Accepted(None),
        }
    }

    pub fn standardize_clinic_name(&self, name: Option<&str>) -> Option<String> {
        fuzzy::standardize(name, &self.settings.canonical_clinics, self.settings.fuzzy_threshold)
    }

    #[instrument(skip(self, raw), fields(url = %raw.source_url))]
    pub async fn process(&self, raw: &RawRecord) -> Option<ProcessedRecord> {
        let Some(address) = self.parse_address(raw.address.as_deref()) else {
            warn!("Address could not be parsed for {}. Skipping.", raw.source_url);
            return None;
        };

        let coords = match self.validate_location(&address.full_address).await {
            LocationVerdict::Accepted(coords) => coords,
            LocationVerdict::CityNotMentioned => {
                info!("Doctor at {} appears to be outside {}. Skipping.", raw.source_url, self.settings.city);
                return None;
            }
            LocationVerdict::OutsideRegion(c) => {
                info!(
                    "Doctor at {} geocodes to ({}, {}), outside the region. Skipping.",
                    raw.source_url, c.lat, c.lon
                );
                return None;
            }
        };

        let specialty_classified = classify_specialty(raw.specialty.as_deref()).to_string();
        debug!("Classified '{:?}' as {}", raw.specialty, specialty_classified);

        let reviews = &raw.ratings_and_reviews;
        Some(ProcessedRecord {
            doctor_name: raw.doctor_name.clone(),
            specialty_raw: raw.specialty.clone(),
            specialty_classified,
            years_of_experience: raw.years_of_experience,
            clinic_hospital_raw: raw.clinic_name.clone(),
            clinic_hospital_standardized: self.standardize_clinic_name(raw.clinic_name.as_deref()),
            complete_address: address.full_address,
            locality: address.locality,
            pincode: address.pincode,
            geo_coordinates: coords,
            ratings: reviews.overall_rating.clone(),
            review_count: reviews.total_reviews,
            reviews_summary: reviews.reviews_summary.clone(),
            recommendation_percent: raw.recommendation_percent,
            contact_number: raw.contact_number.clone(),
            contact_email: raw.contact_email.clone(),
            source_url: raw.source_url.clone(),
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedGeocoder(Option<GeoCoordinates>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _address: &str) -> Option<GeoCoordinates> {
            self.0
        }
    }

    fn processor(coords: Option<GeoCoordinates>) -> DataProcessor {
        DataProcessor::new(ProcessorSettings::from(&Config::default()), Arc::new(FixedGeocoder(coords))).unwrap()
    }

    fn raw_record(address: Option<&str>) -> RawRecord {
        RawRecord {
            doctor_name: Some("Dr. Asha Kulkarni".to_string()),
            specialty: Some("Interventional Cardiology".to_string()),
            years_of_experience: Some(18),
            recommendation_percent: Some(96),
            clinic_name: Some("Ruby Hall Clinic Pune".to_string()),
            address: address.map(str::to_string),
            source_url: "https://www.practo.com/pune/doctor/asha".to_string(),
            ..RawRecord::default()
        }
    }

    const INSIDE: GeoCoordinates = GeoCoordinates { lat: 18.53, lon: 73.87 };

    #[test]
    fn test_parse_address() {
        let p = processor(None);
        let info = p
            .parse_address(Some("40, Sassoon Road,  Sangamvadi,\n Pune 411001"))
            .unwrap();
        assert_eq!(info.full_address, "40, Sassoon Road, Sangamvadi, Pune 411001");
        assert_eq!(info.locality, "Sangamvadi");
        assert_eq!(info.pincode.as_deref(), Some("411001"));
    }

    #[test]
    fn test_parse_address_without_commas_or_pincode() {
        let p = processor(None);
        let info = p.parse_address(Some("  Kothrud Pune  ")).unwrap();
        assert_eq!(info.locality, "Kothrud Pune");
        assert_eq!(info.pincode, None);
        // Another city's pincode does not count
        assert_eq!(p.parse_address(Some("Andheri, Mumbai 400053")).unwrap().pincode, None);
    }

    #[test]
    fn test_parse_address_missing() {
        let p = processor(None);
        assert!(p.parse_address(None).is_none());
        assert!(p.parse_address(Some("   ")).is_none());
    }

    #[test]
    fn test_invalid_pincode_prefix() {
        let mut settings = ProcessorSettings::from(&Config::default());
        settings.pincode_prefix = "41a".to_string();
        assert!(DataProcessor::new(settings, Arc::new(FixedGeocoder(None))).is_err());
    }

    #[tokio::test]
    async fn test_validate_location() {
        assert_eq!(
            processor(Some(INSIDE)).validate_location("Camp, Pune").await,
            LocationVerdict::Accepted(Some(INSIDE))
        );
        assert_eq!(
            processor(None).validate_location("Camp, PUNE").await,
            LocationVerdict::Accepted(None)
        );
        assert_eq!(
            processor(Some(INSIDE)).validate_location("Andheri, Mumbai").await,
            LocationVerdict::CityNotMentioned
        );
        let far = GeoCoordinates { lat: 19.07, lon: 72.87 };
        assert_eq!(
            processor(Some(far)).validate_location("Pune Road, Mumbai").await,
            LocationVerdict::OutsideRegion(far)
        );
    }

    #[tokio::test]
    async fn test_process_builds_record() {
        let p = processor(Some(INSIDE));
        let record = p
            .process(&raw_record(Some("40, Sassoon Road, Sangamvadi, Pune 411001")))
            .await
            .unwrap();

        assert_eq!(record.specialty_classified, "Cardiology");
        assert_eq!(record.clinic_hospital_raw.as_deref(), Some("Ruby Hall Clinic Pune"));
        assert_eq!(record.clinic_hospital_standardized.as_deref(), Some("Ruby Hall Clinic"));
        assert_eq!(record.locality, "Sangamvadi");
        assert_eq!(record.pincode.as_deref(), Some("411001"));
        assert_eq!(record.geo_coordinates, Some(INSIDE));
        assert_eq!(record.review_count, 0);
        assert_eq!(record.recommendation_percent, Some(96));
    }

    #[tokio::test]
    async fn test_process_discards_unplaceable_records() {
        let p = processor(Some(INSIDE));
        assert!(p.process(&raw_record(None)).await.is_none());
        assert!(p.process(&raw_record(Some("Bandra, Mumbai 400050"))).await.is_none());

        let outside = processor(Some(GeoCoordinates { lat: 18.0, lon: 73.8 }));
        assert!(outside.process(&raw_record(Some("Pune Satara Road, Pune"))).await.is_none());
    }
}
