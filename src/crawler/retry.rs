//! Bounded exponential-backoff retries around a single fetch

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch, Document, FetchError, Transport};
use std::time::Duration;
use url::Url;

/// How many times a URL is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,

    /// Base delay; the wait before attempt `k + 1` is `2^k * base_delay`
    pub base_delay: Duration,

    /// Timeout applied to each individual attempt
    pub fetch_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            fetch_timeout: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based) before the next one
    ///
    /// With the default base this is 2s after the first failure and 4s after
    /// the second.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(20));
        self.base_delay.saturating_mul(factor)
    }
}

/// Result of fetching one URL under a retry policy
#[derive(Debug)]
pub struct RetryOutcome {
    /// The document, or the error of the last attempt
    pub result: Result<Document, FetchError>,

    /// Number of attempts made
    pub attempts: u32,
}

impl RetryOutcome {
    /// Number of attempts beyond the first
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Fetches `url`, retrying transient failures with exponential backoff
///
/// Timeouts, network errors and retryable statuses are attempted up to
/// `policy.max_attempts` times in total. Parse errors and permanent statuses
/// return immediately. After the last attempt the final error is returned;
/// callers treat any error as a skipped page.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    url: &Url,
    depth: u32,
    policy: &RetryPolicy,
) -> RetryOutcome {
    let mut attempt = 1;

    loop {
        tracing::debug!("Fetching {} (depth {}, attempt {})", url, depth, attempt);

        match fetch(transport, url, policy.fetch_timeout).await {
            Ok(document) => {
                return RetryOutcome {
                    result: Ok(document),
                    attempts: attempt,
                }
            }
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!("Retrying {} in {:?} due to {}", url, delay, error);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                if error.is_transient() {
                    tracing::warn!("Giving up on {} after {} attempts: {}", url, attempt, error);
                }
                return RetryOutcome {
                    result: Err(error),
                    attempts: attempt,
                };
            }
        }
    }
}
