//! Progress tracking for a crawl run
//!
//! The estimate is `visited / (visited + queued)`, where `visited` counts every
//! URL claimed so far. The denominator grows as links are discovered, so the
//! raw value can drop; the tracker only ever reports a value at least as high
//! as the previous one and holds it below 100 until the run is finalized.

use crate::state::RunSnapshot;
use std::time::Duration;
use tokio::time::Instant;

/// Highest percentage reported before the run is finalized
const MAX_RUNNING_PERCENT: u8 = 99;

/// One progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Completion estimate in `0..=100`
    pub percent: u8,
    pub visited: usize,
    pub queued: usize,
    pub in_flight: usize,
}

impl ProgressUpdate {
    pub fn is_final(&self) -> bool {
        self.percent == 100
    }
}

/// Receives progress updates from the coordinator
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, update: ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressUpdate) + Send,
{
    fn on_progress(&mut self, update: ProgressUpdate) {
        self(update)
    }
}

/// Observer that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&mut self, _update: ProgressUpdate) {}
}

/// Raw estimate for the given counters, in `0..=100`
pub fn estimate(visited: usize, queued: usize) -> u8 {
    let total = visited + queued;
    if total == 0 {
        return 0;
    }
    ((visited as u128 * 100) / total as u128) as u8
}

/// Throttled, monotonic progress reporter
#[derive(Debug)]
pub struct ProgressTracker {
    interval: Duration,
    last_emit: Option<Instant>,
    percent: u8,
    finished: bool,
}

impl ProgressTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            percent: 0,
            finished: false,
        }
    }

    /// Current reported percentage
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Records a completion and returns the update to deliver, if any
    ///
    /// Returns `None` when the previous update was less than `interval` ago or
    /// when the run has already been finalized.
    pub fn update(&mut self, snapshot: &RunSnapshot) -> Option<ProgressUpdate> {
        if self.finished {
            return None;
        }

        let raw = estimate(snapshot.visited, snapshot.queued).min(MAX_RUNNING_PERCENT);
        self.percent = self.percent.max(raw);

        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_emit = Some(now);

        Some(self.build(snapshot))
    }

    /// Returns the 100% update; only the first call yields a value
    pub fn finish(&mut self, snapshot: &RunSnapshot) -> Option<ProgressUpdate> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.percent = 100;
        Some(self.build(snapshot))
    }

    fn build(&self, snapshot: &RunSnapshot) -> ProgressUpdate {
        ProgressUpdate {
            percent: self.percent,
            visited: snapshot.visited,
            queued: snapshot.queued,
            in_flight: snapshot.in_flight,
        }
    }
}
