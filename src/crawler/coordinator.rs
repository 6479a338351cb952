//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Resetting run state and seeding the frontier
//! - Dispatching fetch+retry+extract units up to the concurrency limit
//! - Recording page records in completion order
//! - Enqueueing discovered links at the next depth
//! - Cooperative cancellation and the single terminal signal

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, HttpTransport, Transport};
use crate::crawler::parser::{extract, ExtractedPage};
use crate::crawler::progress::{ProgressObserver, ProgressTracker};
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::crawler::scheduler::{FrontierItem, ScheduledFetch, Scheduler};
use crate::record::{ContentFlags, ResultSet};
use crate::state::{CrawlPhase, RunState};
use crate::url::{normalize_url, DomainScope};
use crate::GleanError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Summary counters for one finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages that produced a record
    pub pages_recorded: usize,

    /// Pages whose fetch still failed after every attempt
    pub pages_failed: usize,

    /// Pages dropped without retry (bad status, not HTML, unparsable)
    pub pages_skipped: usize,

    /// Attempts made beyond the first, across all pages
    pub retries: u32,

    /// Distinct URLs claimed for the frontier, seed included
    pub urls_discovered: usize,

    /// Highest number of fetches in flight at once
    pub peak_in_flight: usize,

    pub cancelled: bool,
}

impl CrawlReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Pages that reached a terminal outcome
    pub fn pages_completed(&self) -> usize {
        self.pages_recorded + self.pages_failed + self.pages_skipped
    }
}

/// Everything a run hands back once it is finalized
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub results: ResultSet,
    pub report: CrawlReport,
}

/// What a single unit of work ended with
#[derive(Debug)]
enum UnitOutcome {
    Recorded(ExtractedPage),
    /// Transient failure that outlasted the retry budget
    Failed(FetchError),
    /// Permanent failure, never retried
    Skipped(FetchError),
}

#[derive(Debug)]
struct UnitResult {
    item: FrontierItem,
    attempts: u32,
    outcome: UnitOutcome,
}

/// Counters accumulated while the run loop is active
#[derive(Debug, Default)]
struct Tally {
    recorded: usize,
    failed: usize,
    skipped: usize,
    retries: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    state: Arc<RunState>,
    scheduler: Scheduler,
}

impl Coordinator {
    /// Creates a coordinator that fetches through `transport`
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let state = Arc::new(RunState::new(
            config.crawler.concurrency_limit as usize,
            config.crawler.max_depth,
            config.content,
        ));
        let scope = DomainScope::new(&config.scope.allowed_domains);
        let scheduler = Scheduler::new(Arc::clone(&state), scope);
        let policy = RetryPolicy::from_config(&config.crawler);

        Self {
            config,
            transport,
            policy,
            state,
            scheduler,
        }
    }

    /// Creates a coordinator backed by a reqwest client
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(GleanError)` - The HTTP client could not be built
    pub fn with_http(config: Config) -> Result<Self, GleanError> {
        let transport = HttpTransport::from_config(&config.user_agent)?
            .with_body_limit(config.crawler.max_body_bytes);
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Shared handle to the run counters, for observers
    pub fn state(&self) -> Arc<RunState> {
        Arc::clone(&self.state)
    }

    /// Runs one crawl from `seed` to finalization
    ///
    /// This is the core crawling logic that:
    /// 1. Resets run state and seeds the frontier at depth 0
    /// 2. Keeps up to `concurrency-limit` units in flight
    /// 3. Appends each extracted record as its unit completes
    /// 4. Enqueues discovered links at depth + 1 while not cancelled
    /// 5. Stops when the frontier is empty and nothing is in flight
    ///
    /// Cancelling `cancel` clears the frontier; fetches already in flight are
    /// awaited and their records kept. Per-page failures never end the run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run was finalized
    /// * `Err(GleanError)` - The seed URL is invalid or the run could not start
    pub async fn run(
        &mut self,
        seed: &str,
        cancel: CancellationToken,
        observer: &mut dyn ProgressObserver,
    ) -> Result<CrawlOutcome, GleanError> {
        let seed_url = normalize_url(seed)?;

        self.state.reset();
        self.scheduler.reset();
        self.state.transition(CrawlPhase::Running)?;

        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (max depth {}, concurrency {}, content {})",
            seed_url,
            self.state.max_depth(),
            self.state.concurrency_limit(),
            self.state.content_flags()
        );

        self.scheduler.seed(seed_url);

        let mut tasks: JoinSet<UnitResult> = JoinSet::new();
        let mut results = ResultSet::new();
        let mut tally = Tally::default();
        let mut tracker = ProgressTracker::new(Duration::from_millis(
            self.config.crawler.progress_interval_ms,
        ));

        loop {
            if !self.state.is_cancelled() && cancel.is_cancelled() {
                self.cancel_run()?;
            }

            if self.state.phase() == CrawlPhase::Draining && !self.scheduler.is_empty() {
                self.state.transition(CrawlPhase::Running)?;
            }

            if self.state.phase().accepts_dispatch() {
                while let Some(scheduled) = self.scheduler.next_dispatch() {
                    tasks.spawn(process_unit(
                        Arc::clone(&self.transport),
                        self.policy,
                        self.state.content_flags(),
                        self.config.crawler.text_limit,
                        scheduled,
                    ));
                }
            }

            if tasks.is_empty() {
                break;
            }

            if self.state.phase() == CrawlPhase::Running && self.scheduler.is_empty() {
                self.state.transition(CrawlPhase::Draining)?;
            }

            tokio::select! {
                _ = cancel.cancelled(), if !self.state.is_cancelled() => {
                    self.cancel_run()?;
                }
                joined = tasks.join_next() => {
                    match joined {
                        Some(Ok(unit)) => self.complete_unit(unit, &mut results, &mut tally),
                        Some(Err(e)) => {
                            self.state.record_completed();
                            tally.failed += 1;
                            tracing::error!("Crawl worker failed: {}", e);
                        }
                        None => break,
                    }

                    if let Some(update) = tracker.update(&self.state.snapshot()) {
                        observer.on_progress(update);
                    }
                }
            }
        }

        self.state.transition(CrawlPhase::Finalized)?;
        let snapshot = self.state.snapshot();
        if let Some(update) = tracker.finish(&snapshot) {
            observer.on_progress(update);
        }

        let report = CrawlReport {
            seed: seed.to_string(),
            started_at,
            finished_at: Utc::now(),
            pages_recorded: tally.recorded,
            pages_failed: tally.failed,
            pages_skipped: tally.skipped,
            retries: tally.retries,
            urls_discovered: snapshot.visited,
            peak_in_flight: snapshot.peak_in_flight,
            cancelled: snapshot.cancelled,
        };

        tracing::info!(
            "Crawl finished: {} pages recorded, {} failed, {} skipped in {}ms{}",
            report.pages_recorded,
            report.pages_failed,
            report.pages_skipped,
            report.duration().num_milliseconds(),
            if report.cancelled { " (cancelled)" } else { "" }
        );

        Ok(CrawlOutcome { results, report })
    }

    /// Stops dispatch and drops the frontier; in-flight units keep running
    fn cancel_run(&mut self) -> Result<(), GleanError> {
        self.state.mark_cancelled();
        let dropped = self.scheduler.cancel();
        self.state.transition(CrawlPhase::Cancelled)?;
        tracing::info!(
            "Crawl cancelled: {} queued URLs dropped, waiting for {} in flight",
            dropped,
            self.state.in_flight()
        );
        Ok(())
    }

    fn complete_unit(&mut self, unit: UnitResult, results: &mut ResultSet, tally: &mut Tally) {
        self.state.record_completed();
        tally.retries += unit.attempts.saturating_sub(1);

        match unit.outcome {
            UnitOutcome::Recorded(page) => {
                tracing::debug!(
                    "Recorded {} (depth {}, {} outbound links)",
                    unit.item.url,
                    unit.item.depth,
                    page.outbound.len()
                );
                tally.recorded += 1;

                if !self.state.is_cancelled() {
                    let next_depth = unit.item.depth + 1;
                    for link in page.outbound {
                        // Rejections (depth, scope, already claimed) are expected
                        let _ = self.scheduler.offer(link, next_depth);
                    }
                }

                results.push(page.record);
            }
            UnitOutcome::Failed(e) => {
                tally.failed += 1;
                tracing::warn!(
                    "Failed to fetch {} after {} attempts: {}",
                    unit.item.url,
                    unit.attempts,
                    e
                );
            }
            UnitOutcome::Skipped(e) => {
                tally.skipped += 1;
                tracing::warn!("Skipping {}: {}", unit.item.url, e);
            }
        }
    }
}

/// One fetch+retry+extract unit
///
/// The HTML tree is built and dropped inside `extract`, after the last await,
/// so the future stays `Send`.
async fn process_unit(
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    flags: ContentFlags,
    text_limit: usize,
    scheduled: ScheduledFetch,
) -> UnitResult {
    let ScheduledFetch { item, _permit } = scheduled;
    let fetched = fetch_with_retry(transport.as_ref(), &item.url, item.depth, &policy).await;
    let attempts = fetched.attempts;

    let outcome = match fetched.result {
        Ok(document) => match extract(&document, flags, text_limit) {
            Ok(page) => UnitOutcome::Recorded(page),
            Err(e) => UnitOutcome::Skipped(e),
        },
        Err(e) if e.is_transient() => UnitOutcome::Failed(e),
        Err(e) => UnitOutcome::Skipped(e),
    };

    UnitResult {
        item,
        attempts,
        outcome,
    }
}

/// Runs a complete crawl with the reqwest transport and no progress observer
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the HTTP client
/// 2. Seed the frontier with `seed` at depth 0
/// 3. Fetch, extract and follow links up to the configured depth
/// 4. Return the records in completion order with a run report
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finalized, possibly after cancellation
/// * `Err(GleanError)` - Crawl could not start
///
/// # Example
///
/// ```no_run
/// use gleaner::config::Config;
/// use gleaner::crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = crawl(Config::default(), "https://example.com/", CancellationToken::new()).await?;
/// println!("{} pages", outcome.results.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    seed: &str,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, GleanError> {
    let mut coordinator = Coordinator::with_http(config)?;
    coordinator
        .run(seed, cancel, &mut crate::crawler::progress::Silent)
        .await
}
