// src/config.rs
// =============================================================================
// Settings shared by the crawler and the photo detector.
//
// Both structs have sensible defaults so library callers (and tests) can
// start from `::default()` and override a field or two. The CLI builds them
// from its flags.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity sent with every request and matched against robots.txt records.
pub const DEFAULT_USER_AGENT: &str = "RestaurantDataCollector/1.0";

/// Errors raised when a configuration can't be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The crawl would stop before fetching anything
    #[error("max pages must be greater than 0, got {0}")]
    InvalidMaxPages(usize),

    /// A zero timeout makes every request fail immediately
    #[error("timeout must be greater than 0 seconds")]
    InvalidTimeout,

    /// The user agent is also the robots.txt identity, it can't be blank
    #[error("user agent must not be empty")]
    EmptyUserAgent,
}

/// Settings for website crawling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User-Agent header, also used for robots.txt matching
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum queries per second; zero or less disables throttling
    pub rate_limit_qps: f64,
    /// Page budget for a single site
    pub max_pages: usize,
    /// Retries for 500/502/503/504 responses
    pub max_retries: u32,
    /// Redirects followed before a request is given up on
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            rate_limit_qps: 8.0,
            max_pages: 10,
            max_retries: 2,
            max_redirects: 10,
        }
    }
}

impl CrawlerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidMaxPages(self.max_pages));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for OCR-based photo screening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Tesseract language codes
    pub ocr_lang: String,
    /// Name or path of the tesseract executable
    pub tesseract_bin: String,
    /// Write the OCR transcript next to every photo judged a menu
    pub save_ocr: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ocr_lang: "eng+fra".to_string(),
            tesseract_bin: "tesseract".to_string(),
            save_ocr: false,
        }
    }
}
