//! Network utilities for HTTP requests, politeness delays, and content parsing.
//!
//! This module provides the networking layer used by every source:
//!
//! - **HTTP Client**: A global, configured reqwest client with connection pooling
//! - **Rate Limiting**: Per-source delay between consecutive requests
//! - **Fetch Trait**: The seam sources fetch through, so parsers can be driven
//!   from fixtures
//! - **Content Parsing**: HTML and JSON helpers in [`html`] and [`json`]
//!
//! # Examples
//!
//! ```rust
//! use hondana::config::SiteConfig;
//! use hondana::net::{Fetch, HttpClient};
//!
//! # async fn example() -> hondana::Result<()> {
//! let config = SiteConfig::new("https://example.com").with_header("Referer", "https://example.com");
//! let client = HttpClient::from_config("example", &config);
//!
//! let html = client.get_text("https://example.com/comic.html").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::{Client, header::HeaderMap};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::SiteConfig;

pub mod html;
pub mod json;

/// Global HTTP client instance.
///
/// Created lazily on first use and shared by every [`HttpClient`]. There is no
/// request timeout: a hung request hangs the operation that issued it.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("hondana/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// Source of raw response bodies.
///
/// Sources never talk to reqwest directly. They hold an `Arc<dyn Fetch>`,
/// which is an [`HttpClient`] in production and a fixture map in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns the body as text.
    async fn get_text(&self, url: &str) -> crate::Result<String>;
}

/// Per-source rate limiter to avoid hammering a site.
///
/// Tracks the last request time for each source and sleeps until the
/// configured delay has elapsed.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
    default_delay: Duration,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: self.default_delay,
        }
    }
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified delay in milliseconds.
    ///
    /// ```rust
    /// use hondana::net::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(500);
    /// ```
    pub fn new(delay_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: Duration::from_millis(delay_ms),
        }
    }

    /// Waits if necessary before allowing a request for `source_id`.
    pub async fn wait(&self, source_id: &str) {
        let now = Instant::now();
        let wait_duration = {
            let last_map = self.last_request.lock();
            last_map
                .get(source_id)
                .map(|&last| now.duration_since(last))
                .filter(|elapsed| *elapsed < self.default_delay)
                .map(|elapsed| self.default_delay - elapsed)
        };

        if let Some(duration) = wait_duration {
            tokio::time::sleep(duration).await;
        }

        self.last_request
            .lock()
            .insert(source_id.to_string(), Instant::now());
    }
}

/// HTTP client wrapper bound to one source.
///
/// Adds the source's headers to every request and spaces requests out with a
/// [`RateLimiter`]. Failed requests are not retried unless
/// [`with_max_retries`](HttpClient::with_max_retries) says so.
///
/// # Examples
///
/// ```rust
/// use hondana::net::HttpClient;
///
/// let client = HttpClient::new("bainian")
///     .with_rate_limit(1000)
///     .with_header("Referer", "https://m.bnmanhua.com");
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    source_id: String,
    rate_limiter: RateLimiter,
    max_retries: u32,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HTTP client for the specified source.
    ///
    /// Defaults: 200ms between requests, no retries, no extra headers.
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            rate_limiter: RateLimiter::new(200),
            max_retries: 0,
            headers: HeaderMap::new(),
        }
    }

    /// Creates a client configured from a [`SiteConfig`].
    pub fn from_config(source_id: impl Into<String>, config: &SiteConfig) -> Self {
        let mut client = Self::new(source_id)
            .with_rate_limit(config.rate_limit_ms)
            .with_max_retries(config.max_retries);

        if let Some(user_agent) = &config.user_agent {
            client = client.with_header("User-Agent", user_agent);
        }
        for (name, value) in &config.headers {
            client = client.with_header(name, value);
        }

        client
    }

    /// Sets the minimum delay between requests in milliseconds.
    pub fn with_rate_limit(mut self, delay_ms: u64) -> Self {
        self.rate_limiter = RateLimiter::new(delay_ms);
        self
    }

    /// Sets the number of extra attempts for failed requests.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Adds a custom header to all requests made by this client.
    ///
    /// Invalid header names or values are skipped with a warning.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!("[{}] skipping invalid header {:?}", self.source_id, name),
        }
        self
    }

    /// Performs a GET request and returns the raw body.
    ///
    /// A 429 answer is retried with exponential backoff while attempts remain
    /// and otherwise becomes [`Error::RateLimit`](crate::Error::RateLimit).
    /// Any other non-success status becomes [`Error::Source`](crate::Error::Source).
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        let mut attempts = 0;

        loop {
            self.rate_limiter.wait(&self.source_id).await;
            debug!("[{}] GET {}", self.source_id, url);

            match CLIENT.get(url).headers(self.headers.clone()).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response.bytes().await?);
                    }

                    if response.status() == 429 {
                        if attempts < self.max_retries {
                            attempts += 1;
                            let delay = Duration::from_secs(2_u64.pow(attempts));
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok());

                        return Err(crate::Error::rate_limit(retry_after));
                    }

                    return Err(crate::Error::source(
                        &self.source_id,
                        format!("HTTP {} for {}", response.status(), url),
                    ));
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        warn!(
                            "[{}] request to {} failed ({}), attempt {}/{}",
                            self.source_id, url, e, attempts, self.max_retries
                        );
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl Fetch for HttpClient {
    /// Decodes the body as UTF-8, replacing invalid sequences.
    async fn get_text(&self, url: &str) -> crate::Result<String> {
        let bytes = self.get(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
