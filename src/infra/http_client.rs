use crate::app::ports::PageFetcher;
use crate::config::HttpConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Longest single wait between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Rate-limited reqwest fetcher with retries, exponential backoff and
/// user-agent rotation.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .deflate(true);

        // One proxy per client, picked at construction like a session.
        if let Some(proxy_url) = config.proxies.choose(&mut rand::thread_rng()) {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| ScraperError::Config(format!("Invalid proxy '{}': {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn pick_user_agent(&self) -> Option<String> {
        self.config.user_agents.choose(&mut rand::thread_rng()).cloned()
    }

    /// Delay after a failed attempt (0-based): `rate_limit * backoff_factor^attempt`,
    /// capped at [`MAX_BACKOFF`].
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.config.backoff_factor.powi(attempt as i32);
        let secs = (self.config.rate_limit().as_secs_f64() * factor).min(MAX_BACKOFF.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        let mut request = self.client.get(url);
        if let Some(agent) = self.pick_user_agent() {
            request = request.header(USER_AGENT, agent);
        }
        request.send().await?.error_for_status()?.text().await
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            tokio::time::sleep(self.config.rate_limit()).await;

            match self.attempt(url).await {
                Ok(body) => {
                    debug!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed for {}. Error: {}", attempt + 1, attempts, url, e);
                    last_error = e.to_string();
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        error!("All retries failed for {}. Giving up.", url);
        Err(ScraperError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last_error,
        })
    }
}
