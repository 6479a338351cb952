use crate::crawler::DEFAULT_MAX_BODY_BYTES;
use crate::record::ContentFlags;
use serde::Deserialize;

/// Main configuration structure for Gleaner
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub content: ContentFlags,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub scope: ScopeConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of link hops from the seed (the seed is depth 0)
    pub max_depth: u32,

    /// Maximum number of concurrently in-flight fetches
    pub concurrency_limit: u32,

    /// Per-fetch timeout (milliseconds)
    pub fetch_timeout_ms: u64,

    /// Total attempts per URL, the first one included
    pub max_attempts: u32,

    /// Base of the exponential backoff between attempts (milliseconds)
    pub backoff_base_ms: u64,

    /// Character cap applied to extracted page text
    pub text_limit: usize,

    /// Largest response body read per fetch (bytes); larger pages are skipped
    pub max_body_bytes: usize,

    /// Minimum interval between observable progress updates (milliseconds)
    pub progress_interval_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            concurrency_limit: 5,
            fetch_timeout_ms: 10_000,
            max_attempts: 3,
            backoff_base_ms: 1_000,
            text_limit: 1_000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            progress_interval_ms: 100,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "gleaner".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value (`name/version`)
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Export format name; unknown names fall back to txt
    pub format: String,

    /// File name stem of the exported payload
    pub file_name: String,

    /// Directory the exported payload is written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "txt".to_string(),
            file_name: "scrape_result".to_string(),
            directory: ".".to_string(),
        }
    }
}

/// Restricts which discovered links are followed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScopeConfig {
    /// Domain patterns (e.g., "example.com" or "*.example.com"); empty follows everything
    pub allowed_domains: Vec<String>,
}
