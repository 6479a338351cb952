//! Crawler module for web page fetching and processing
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching behind the `Transport` seam
//! - Retries with exponential backoff
//! - Content extraction and link discovery
//! - Frontier and concurrency-slot scheduling
//! - Progress tracking
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod progress;
mod retry;
mod scheduler;

pub use coordinator::{crawl, Coordinator, CrawlOutcome, CrawlReport};
pub use fetcher::{
    build_http_client, fetch, Document, FetchError, HttpTransport, RawResponse, Transport,
    DEFAULT_MAX_BODY_BYTES,
};
pub use parser::{extract, ExtractedPage, DEFAULT_TEXT_LIMIT};
pub use progress::{estimate, ProgressObserver, ProgressTracker, ProgressUpdate, Silent};
pub use retry::{fetch_with_retry, RetryOutcome, RetryPolicy};
pub use scheduler::{Frontier, FrontierItem, Rejection, ScheduledFetch, Scheduler};
