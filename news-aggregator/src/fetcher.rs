use crate::traits::PageFetch;
use crate::types::{AggregatorError, FetchConfig, Result};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rate_limiter: Arc<Mutex<HashMap<String, Instant>>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        self.apply_rate_limit(url).await?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        self.check_size(url, &response)?;

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_body_bytes() {
            return Err(self.too_large(url));
        }

        // Arbitrary pages may not be valid UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn max_body_bytes(&self) -> usize {
        self.config.max_body_size_mb.saturating_mul(1024 * 1024)
    }

    fn too_large(&self, url: &str) -> AggregatorError {
        AggregatorError::BodyTooLarge {
            url: url.to_string(),
            limit_mb: self.config.max_body_size_mb,
        }
    }

    fn check_size(&self, url: &str, response: &Response) -> Result<()> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_body_bytes() {
                return Err(self.too_large(url));
            }
        }
        Ok(())
    }

    async fn apply_rate_limit(&self, url: &str) -> Result<()> {
        let parsed_url = Url::parse(url)?;
        let host = parsed_url.host_str().unwrap_or("").to_string();
        let min_interval = Duration::from_millis(self.config.min_host_interval_ms);

        let mut rate_limiter = self.rate_limiter.lock().await;

        if let Some(last_request) = rate_limiter.get(&host) {
            let elapsed = last_request.elapsed();
            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                debug!("Rate limiting {}: waiting {:?}", host, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        rate_limiter.insert(host, Instant::now());
        Ok(())
    }

    fn backoff(&self) -> ExponentialBackoff<backoff::SystemClock> {
        let delay = Duration::from_secs(self.config.retry_delay_seconds);
        ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            max_interval: delay * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(delay * 60),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageFetch for Fetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching: {}", url);

        let mut backoff = self.backoff();
        let mut attempt = 0;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    info!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(e) => {
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}: {}, retrying in {:?}", attempt + 1, url, e, delay);
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                    }
                    return Err(e);
                }
            }
        }
    }
}
