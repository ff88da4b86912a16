// src/crawl/rate_limit.rs
// =============================================================================
// Keeps requests at least 1/qps seconds apart.
//
// The crawler owns one RateLimiter and calls it around every outbound
// request: robots.txt, page GETs, and PDF HEAD checks. The gap is measured
// from the moment the previous request finished, so a slow response doesn't
// let the next one go out early.
// =============================================================================

use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    // qps <= 0 (or NaN) turns throttling off
    pub fn new(qps: f64) -> Self {
        let min_interval = if qps > 0.0 {
            Duration::try_from_secs_f64(1.0 / qps).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            last_request: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next request may be sent
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
    }

    /// Records that a request just completed
    pub fn mark(&mut self) {
        self.last_request = Some(Instant::now());
    }
}
