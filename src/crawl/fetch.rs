// src/crawl/fetch.rs
// =============================================================================
// This module makes the HTTP requests the crawler needs.
//
// Key functionality:
// - GET for robots.txt and pages (redirects followed)
// - HEAD for checking that a .pdf link really serves a PDF
// - Retries on transient server errors (500/502/503/504) with backoff
// - Sorts reqwest failures into readable error kinds
//
// The crawler talks to the network only through the `Fetcher` trait, so
// tests can swap in a fake and count calls.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::rate_limit::RateLimiter;
use crate::config::CrawlerConfig;

// Statuses worth another try
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// Backoff before the first retry, doubled for each one after, and never
// shorter than the crawler's minimum gap between requests
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// What the crawler keeps from a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFetchResult {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header, lowercased ("" when absent)
    pub content_type: String,
    /// Body text (always empty for HEAD)
    pub body: String,
}

impl PageFetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
            || self.content_type.contains("application/xhtml+xml")
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.contains("application/pdf")
    }
}

/// Reasons a request produced no response
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_builder() {
            FetchError::Client(error.to_string())
        } else {
            FetchError::Other(error.to_string())
        }
    }
}

/// The network capability the crawler depends on
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET with redirects followed; any status is returned, not an error
    async fn get(&self, url: &str) -> Result<PageFetchResult, FetchError>;

    /// HEAD with redirects followed
    async fn head(&self, url: &str) -> Result<PageFetchResult, FetchError>;
}

/// reqwest-backed Fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    // retries happen inside one limiter slot, so they respect its gap here
    min_gap: Duration,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        // One client for the whole crawl (connection pooling), with our
        // identity on every request
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            min_gap: RateLimiter::new(config.rate_limit_qps).min_interval(),
        })
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let backoff = RETRY_BACKOFF.saturating_mul(2u32.saturating_pow(attempt));
        backoff.max(self.min_gap)
    }

    async fn send(&self, method: reqwest::Method, url: &str) -> Result<PageFetchResult, FetchError> {
        let mut attempt = 0;
        loop {
            let response = self.client.request(method.clone(), url).send().await?;
            let status = response.status();

            if RETRY_STATUSES.contains(&status) && attempt < self.max_retries {
                let backoff = self.retry_delay(attempt);
                debug!("{} {} returned {}, retrying in {:?}", method, url, status, backoff);
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_lowercase();

            let body = if method == reqwest::Method::HEAD {
                String::new()
            } else {
                response.text().await?
            };

            return Ok(PageFetchResult {
                status: status.as_u16(),
                content_type,
                body,
            });
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<PageFetchResult, FetchError> {
        self.send(reqwest::Method::GET, url).await
    }

    async fn head(&self, url: &str) -> Result<PageFetchResult, FetchError> {
        self.send(reqwest::Method::HEAD, url).await
    }
}
