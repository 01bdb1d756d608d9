use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review aggregate scraped from a profile page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingsAndReviews {
    pub total_reviews: u32,
    pub overall_rating: Option<String>,
    pub reviews_summary: Vec<String>,
}

/// One doctor's profile page, as scraped. Every field is optional because
/// each one is extracted independently of the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
    pub years_of_experience: Option<u32>,
    pub recommendation_percent: Option<u32>,
    pub clinic_name: Option<String>,
    pub address: Option<String>,
    pub ratings_and_reviews: RatingsAndReviews,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Address pieces pulled out of the raw address string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub full_address: String,
    pub locality: String,
    pub pincode: Option<String>,
}

/// A raw record that passed location validation, with derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub doctor_name: Option<String>,
    pub specialty_raw: Option<String>,
    pub specialty_classified: String,
    pub years_of_experience: Option<u32>,
    pub clinic_hospital_raw: Option<String>,
    pub clinic_hospital_standardized: Option<String>,
    pub complete_address: String,
    pub locality: String,
    pub pincode: Option<String>,
    pub geo_coordinates: Option<GeoCoordinates>,
    pub ratings: Option<String>,
    pub review_count: u32,
    pub reviews_summary: Vec<String>,
    pub recommendation_percent: Option<u32>,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
    pub source_url: String,
    pub processed_at: DateTime<Utc>,
}

/// Outcome of fetching and scraping a single profile URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Scraped,
    /// The page loaded but has no clinic section, so it is not a usable profile.
    MissingContent,
    FetchFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub status: ScrapeStatus,
    pub raw_data: Option<RawRecord>,
}

/// Core trait that every listing site must implement
pub trait ListingSource: Send + Sync {
    /// Unique identifier for this listing site
    fn name(&self) -> &'static str;

    /// Search page URL for one specialty and 1-based page number
    fn search_url(&self, specialty: &str, page: u32) -> String;

    /// Profile URLs found on one search results page, deduplicated
    fn parse_profile_links(&self, html: &str) -> Vec<String>;
}
