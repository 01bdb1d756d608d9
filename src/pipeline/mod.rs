// Doctor data pipeline: discovery, extraction (scrape + process), and export

pub mod discovery;
pub mod export;
pub mod extract;
pub mod processing;

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::apis::create_source;
use crate::app::ports::{Geocoder, PageFetcher, SentimentScorer};
use crate::config::Config;
use crate::constants::get_supported_sources;
use crate::error::{Result, ScraperError};
use crate::infra::geocoder::NominatimGeocoder;
use crate::infra::http_client::HttpFetcher;
use crate::pipeline::discovery::UrlDiscovery;
use crate::pipeline::extract::{process_all, scrape_all, successful_records, ScrapeOutcome};
use crate::pipeline::processing::processor::{DataProcessor, ProcessorSettings};
use crate::pipeline::processing::sentiment::VaderScorer;
use crate::storage;
use crate::types::{ListingSource, ProcessedRecord};

/// Result of the discovery stage
#[derive(Debug, Serialize)]
pub struct DiscoveryResult {
    pub unique_urls: usize,
    pub output_file: PathBuf,
}

/// Result of the scrape + process stage
#[derive(Debug, Serialize)]
pub struct ExtractResult {
    pub urls_attempted: usize,
    pub scraped: usize,
    pub missing_content: usize,
    pub fetch_failed: usize,
    pub with_contact_number: usize,
    pub processed: usize,
    pub raw_file: PathBuf,
    pub processed_file: PathBuf,
}

/// Result of the export stage
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub rows: usize,
    pub output_file: PathBuf,
}

/// Stages wired to their collaborators. Each stage reads the previous
/// stage's output file, so stages can also be run one at a time.
pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    geocoder: Arc<dyn Geocoder>,
    scorer: Arc<dyn SentimentScorer>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        geocoder: Arc<dyn Geocoder>,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            config,
            fetcher,
            geocoder,
            scorer,
        }
    }

    /// Pipeline backed by the real HTTP fetcher, Nominatim and VADER.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.http.clone())?);
        let geocoder = Arc::new(NominatimGeocoder::new(&config.geo)?);
        let scorer = Arc::new(VaderScorer::new());
        Ok(Self::new(config, fetcher, geocoder, scorer))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn sources(&self) -> Vec<Box<dyn ListingSource>> {
        get_supported_sources()
            .into_iter()
            .filter_map(|name| create_source(name, &self.config))
            .collect()
    }

    fn effective_limit(&self, limit: Option<usize>) -> Option<usize> {
        limit.or(self.config.pipeline.test_limit)
    }

    #[instrument(skip(self))]
    pub async fn discover(&self) -> Result<DiscoveryResult> {
        let start = Instant::now();
        let discovery = UrlDiscovery::new(
            Arc::clone(&self.fetcher),
            self.config.pipeline.max_pages,
            self.config.output.debug_dir.clone(),
        );

        let urls = discovery
            .discover_all(&self.sources(), &self.config.target.specialties)
            .await;
        storage::write_urls(&self.config.output.urls_file, &urls)?;

        info!("URL discovery finished in {:.2}s", start.elapsed().as_secs_f64());
        Ok(DiscoveryResult {
            unique_urls: urls.len(),
            output_file: self.config.output.urls_file.clone(),
        })
    }

    #[instrument(skip(self))]
    pub async fn extract(&self, limit: Option<usize>) -> Result<ExtractResult> {
        let start = Instant::now();
        let urls_file = &self.config.output.urls_file;
        let mut urls = storage::read_urls(urls_file).map_err(|e| {
            ScraperError::Config(format!("Input file not readable: {} ({})", urls_file.display(), e))
        })?;

        if let Some(limit) = self.effective_limit(limit) {
            urls.truncate(limit);
            info!("Test limit {} applied; scraping first {} URLs", limit, urls.len());
        }

        let (results, outcome) =
            scrape_all(Arc::clone(&self.fetcher), &urls, self.config.pipeline.scrape_concurrency).await;
        storage::write_json(&self.config.output.raw_file, &results)?;

        let records = successful_records(results);
        let processed = if records.is_empty() {
            warn!("No profiles were scraped; nothing to process.");
            Vec::new()
        } else {
            let processor = Arc::new(DataProcessor::new(
                ProcessorSettings::from(&self.config),
                Arc::clone(&self.geocoder),
            )?);
            process_all(processor, &records, self.config.pipeline.process_concurrency).await
        };
        storage::write_json(&self.config.output.processed_file, &processed)?;

        info!("Extraction finished in {:.2}s", start.elapsed().as_secs_f64());
        let ScrapeOutcome {
            total,
            scraped,
            missing_content,
            fetch_failed,
            with_contact_number,
        } = outcome;
        Ok(ExtractResult {
            urls_attempted: total,
            scraped,
            missing_content,
            fetch_failed,
            with_contact_number,
            processed: processed.len(),
            raw_file: self.config.output.raw_file.clone(),
            processed_file: self.config.output.processed_file.clone(),
        })
    }

    #[instrument(skip(self))]
    pub fn export(&self, limit: Option<usize>) -> Result<ExportResult> {
        let records: Vec<ProcessedRecord> = storage::read_json(&self.config.output.processed_file)?;
        let rows = export::build_rows(&records, self.effective_limit(limit), self.scorer.as_ref());
        export::write_workbook(&rows, &self.config.output.excel_file)?;

        Ok(ExportResult {
            rows: rows.len(),
            output_file: self.config.output.excel_file.clone(),
        })
    }
}
