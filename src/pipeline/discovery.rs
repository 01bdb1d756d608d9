use futures::future::join_all;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::PageFetcher;
use crate::types::ListingSource;

/// Walks listing pages and collects doctor profile URLs.
pub struct UrlDiscovery {
    fetcher: Arc<dyn PageFetcher>,
    max_pages: u32,
    debug_dir: Option<PathBuf>,
}

impl UrlDiscovery {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_pages: u32, debug_dir: Option<PathBuf>) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
            debug_dir,
        }
    }

    /// Paginate one specialty until a page fails to load, has no profile
    /// links, or adds nothing new (sites that clamp past-the-end pages
    /// to the last one).
    #[instrument(skip(self, source), fields(source = source.name()))]
    pub async fn discover_specialty(&self, source: &dyn ListingSource, specialty: &str) -> Vec<String> {
        info!("Starting {} scrape for specialty: {}", source.name(), specialty);
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for page in 1..=self.max_pages {
            let search_url = source.search_url(specialty, page);
            debug!("[{}] Fetching page {} for {}: {}", source.name(), page, specialty, search_url);

            let html = match self.fetcher.fetch(&search_url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("[{}] No response for page {} of {} ({}). Stopping.", source.name(), page, specialty, e);
                    break;
                }
            };

            let links = source.parse_profile_links(&html);
            if links.is_empty() {
                if page == 1 {
                    warn!(
                        "[{}] No profiles found on the FIRST page for {}. This might indicate a selector change.",
                        source.name(),
                        specialty
                    );
                    self.save_debug_page(source.name(), specialty, &html).await;
                }
                info!("[{}] No more profiles found for {} on page {}.", source.name(), specialty, page);
                break;
            }

            let found = links.len();
            let mut new_links = 0;
            for link in links {
                if seen.insert(link.clone()) {
                    urls.push(link);
                    new_links += 1;
                }
            }
            info!("[{}] Found {} links on page {}. {} are new.", source.name(), found, page, new_links);

            if new_links == 0 {
                info!("[{}] Page {} repeated earlier results for {}. Stopping.", source.name(), page, specialty);
                break;
            }
        }

        info!("[{}] Finished scraping for {}. Found {} total unique URLs.", source.name(), specialty, urls.len());
        urls
    }

    /// Run every (source, specialty) pair concurrently and merge the results,
    /// keeping the first occurrence of each URL.
    pub async fn discover_all(&self, sources: &[Box<dyn ListingSource>], specialties: &[String]) -> Vec<String> {
        let tasks = sources.iter().flat_map(|source| {
            specialties
                .iter()
                .map(move |specialty| self.discover_specialty(source.as_ref(), specialty))
        });
        let results = join_all(tasks).await;

        let all: Vec<String> = results.into_iter().flatten().collect();
        if all.is_empty() {
            warn!("No URLs were found.");
            return all;
        }
        info!("Total URLs found before deduplication: {}", all.len());

        let unique = dedupe_preserving_order(all);
        info!("Total unique URLs after deduplication: {}", unique.len());
        unique
    }

    async fn save_debug_page(&self, source: &str, specialty: &str, html: &str) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let path = dir.join(format!("{}_{}_page1.html", source, specialty));
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("Could not create debug directory {}: {}", dir.display(), e);
            return;
        }
        match tokio::fs::write(&path, html).await {
            Ok(()) => info!("Saved page HTML to {} for analysis", path.display()),
            Err(e) => warn!("Could not save debug page {}: {}", path.display(), e),
        }
    }
}

pub fn dedupe_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}
