use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ScraperError};
use crate::pipeline::processing::geo::BoundingBox;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "doctor_scraper.toml";
/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "DOCTOR_SCRAPER_CONFIG";

/// Largest accepted `http.backoff_factor`.
pub const MAX_BACKOFF_FACTOR: f64 = 10.0;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub http: HttpConfig,
    pub geo: GeoConfig,
    pub matching: MatchingConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// City and specialties to discover.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub city: String,
    pub specialties: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            city: "pune".to_string(),
            specialties: [
                "cardiologist",
                "dermatologist",
                "neurologist",
                "oncologist",
                "general-surgeon",
                "orthopedist",
                "neurosurgeon",
                "pediatrician",
                "gynecologist-obstetrician",
                "psychiatrist",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Pause before every request attempt.
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub timeout_secs: u64,
    pub user_agents: Vec<String>,
    pub proxies: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: 2000,
            max_retries: 3,
            backoff_factor: 0.5,
            timeout_secs: 20,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36".to_string(),
            ],
            proxies: Vec::new(),
        }
    }
}

impl HttpConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub bounding_box: BoundingBox,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    /// Nominatim allows at most one request per second.
    pub geocoder_interval_ms: u64,
    pub geocoder_timeout_secs: u64,
    /// Leading digits shared by every pincode in the target city.
    pub pincode_prefix: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox {
                min_lat: 18.40,
                max_lat: 18.64,
                min_lon: 73.75,
                max_lon: 74.00,
            },
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            geocoder_user_agent: "DoctorDataScraper/1.0".to_string(),
            geocoder_interval_ms: 1000,
            geocoder_timeout_secs: 25,
            pincode_prefix: "411".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub canonical_clinics: Vec<String>,
    /// Score out of 100 a clinic name needs to map onto a canonical name.
    pub fuzzy_threshold: u8,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            canonical_clinics: [
                "Jehangir Hospital",
                "Ruby Hall Clinic",
                "Sahyadri Super Speciality Hospital",
                "Manipal Hospital",
                "Deenanath Mangeshkar Hospital",
                "KEM Hospital",
                "Noble Hospital",
                "Aditya Birla Memorial Hospital",
                "Inamdar Multispeciality Hospital",
                "Poona Hospital and Research Centre",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fuzzy_threshold: 85,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scrape_concurrency: usize,
    pub process_concurrency: usize,
    /// Upper bound on listing pages fetched per specialty.
    pub max_pages: u32,
    /// Only the first N URLs / records are handled when set.
    pub test_limit: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scrape_concurrency: 5,
            process_concurrency: 2,
            max_pages: 200,
            test_limit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub urls_file: PathBuf,
    pub raw_file: PathBuf,
    pub processed_file: PathBuf,
    pub excel_file: PathBuf,
    /// Where listing pages without any profile links are dumped.
    pub debug_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            urls_file: PathBuf::from("output/unique_doctor_urls.csv"),
            raw_file: PathBuf::from("output/raw_scraped_data.json"),
            processed_file: PathBuf::from("output/structured_doctor_data.json"),
            excel_file: PathBuf::from("output/doctors_data.xlsx"),
            debug_dir: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, `$DOCTOR_SCRAPER_CONFIG`, or `doctor_scraper.toml`.
    ///
    /// A missing default file yields the built-in defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.city.trim().is_empty() {
            return Err(ScraperError::Config("target.city must not be empty".into()));
        }
        if self.pipeline.scrape_concurrency == 0 || self.pipeline.process_concurrency == 0 {
            return Err(ScraperError::Config(
                "pipeline concurrency limits must be at least 1".into(),
            ));
        }
        if self.pipeline.max_pages == 0 {
            return Err(ScraperError::Config("pipeline.max_pages must be at least 1".into()));
        }
        if self.http.max_retries == 0 {
            return Err(ScraperError::Config("http.max_retries must be at least 1".into()));
        }
        if !(0.0..=MAX_BACKOFF_FACTOR).contains(&self.http.backoff_factor) {
            return Err(ScraperError::Config(format!(
                "http.backoff_factor must be between 0 and {}",
                MAX_BACKOFF_FACTOR
            )));
        }
        if self.matching.fuzzy_threshold > 100 {
            return Err(ScraperError::Config(
                "matching.fuzzy_threshold is a score out of 100".into(),
            ));
        }
        let bbox = &self.geo.bounding_box;
        if bbox.min_lat > bbox.max_lat || bbox.min_lon > bbox.max_lon {
            return Err(ScraperError::Config(
                "geo.bounding_box minimums must not exceed maximums".into(),
            ));
        }
        Ok(())
    }

    /// Listing site root for the configured city.
    pub fn practo_base_url(&self) -> String {
        format!("https://www.practo.com/{}", self.target.city.to_lowercase())
    }
}
