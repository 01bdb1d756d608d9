use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::PageFetcher;
use crate::pipeline::processing::processor::DataProcessor;
use crate::pipeline::processing::profile::ProfileScraper;
use crate::types::{ProcessedRecord, RawRecord, ScrapeResult, ScrapeStatus};

/// Counts from one extraction run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScrapeOutcome {
    pub total: usize,
    pub scraped: usize,
    pub missing_content: usize,
    pub fetch_failed: usize,
    pub with_contact_number: usize,
}

impl ScrapeOutcome {
    fn tally(results: &[ScrapeResult]) -> Self {
        let mut outcome = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                ScrapeStatus::Scraped => outcome.scraped += 1,
                ScrapeStatus::MissingContent => outcome.missing_content += 1,
                ScrapeStatus::FetchFailed => outcome.fetch_failed += 1,
            }
            if result
                .raw_data
                .as_ref()
                .is_some_and(|r| r.contact_number.is_some())
            {
                outcome.with_contact_number += 1;
            }
        }
        outcome
    }
}

/// Parse one profile page. Kept synchronous so the parsed document never
/// lives across an await point.
pub fn scrape_profile_html(url: &str, html: &str) -> ScrapeResult {
    let scraper = ProfileScraper::new(html);
    if !scraper.has_profile_content() {
        warn!("Profile content not found for {}. Skipping.", url);
        return ScrapeResult {
            url: url.to_string(),
            status: ScrapeStatus::MissingContent,
            raw_data: None,
        };
    }

    let record = scraper.extract_data(url);
    debug!("Scraped {:?} from {}", record.doctor_name, url);
    ScrapeResult {
        url: url.to_string(),
        status: ScrapeStatus::Scraped,
        raw_data: Some(record),
    }
}

/// Fetch and scrape every profile URL, at most `concurrency` at a time.
/// Results keep the order of `urls`.
#[instrument(skip(fetcher, urls), fields(url_count = urls.len()))]
pub async fn scrape_all(
    fetcher: Arc<dyn PageFetcher>,
    urls: &[String],
    concurrency: usize,
) -> (Vec<ScrapeResult>, ScrapeOutcome) {
    info!("Starting detailed scraping for {} URLs...", urls.len());

    let results: Vec<ScrapeResult> = stream::iter(urls.iter())
        .map(|url| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                match fetcher.fetch(url).await {
                    Ok(html) => scrape_profile_html(url, &html),
                    Err(e) => {
                        warn!("Failed to fetch profile {}: {}", url, e);
                        ScrapeResult {
                            url: url.clone(),
                            status: ScrapeStatus::FetchFailed,
                            raw_data: None,
                        }
                    }
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let outcome = ScrapeOutcome::tally(&results);
    info!(
        "Scraped {}/{} profiles ({} without profile content, {} failed to load)",
        outcome.scraped, outcome.total, outcome.missing_content, outcome.fetch_failed
    );
    info!(
        "Contact number extraction: {}/{} successful",
        outcome.with_contact_number, outcome.scraped
    );
    (results, outcome)
}

/// Raw records from the successful scrapes, in order.
pub fn successful_records(results: Vec<ScrapeResult>) -> Vec<RawRecord> {
    results.into_iter().filter_map(|r| r.raw_data).collect()
}

/// Validate and enrich records with at most `concurrency` in flight.
/// Rejected records are dropped; survivors keep their input order.
#[instrument(skip(processor, records), fields(record_count = records.len()))]
pub async fn process_all(
    processor: Arc<DataProcessor>,
    records: &[RawRecord],
    concurrency: usize,
) -> Vec<ProcessedRecord> {
    info!("Processing {} raw records...", records.len());
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let tasks = records.iter().map(|record| {
        let semaphore = Arc::clone(&semaphore);
        let processor = Arc::clone(&processor);
        async move {
            let _permit = semaphore.acquire().await.ok()?;
            processor.process(record).await
        }
    });

    let processed: Vec<ProcessedRecord> = join_all(tasks).await.into_iter().flatten().collect();
    info!(
        "Processed {} records; {} dropped by location validation",
        processed.len(),
        records.len() - processed.len()
    );
    processed
}
