//! Per-run counters shared between the coordinator and its observers
//!
//! The coordinator is the only writer: mutators are crate-private. Everyone
//! else reads through [`RunState::snapshot`].

use crate::record::ContentFlags;
use crate::state::CrawlPhase;
use crate::GleanError;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Mutable state of one crawl run
#[derive(Debug)]
pub struct RunState {
    concurrency_limit: usize,
    max_depth: u32,
    content_flags: ContentFlags,

    phase: AtomicU8,
    cancelled: AtomicBool,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    queued: AtomicUsize,
    visited: AtomicUsize,
    completed: AtomicUsize,
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSnapshot {
    pub phase: CrawlPhase,
    pub cancelled: bool,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub queued: usize,
    pub visited: usize,
    pub completed: usize,
}

impl RunState {
    pub fn new(concurrency_limit: usize, max_depth: u32, content_flags: ContentFlags) -> Self {
        Self {
            concurrency_limit,
            max_depth,
            content_flags,
            phase: AtomicU8::new(CrawlPhase::Idle.to_u8()),
            cancelled: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            queued: AtomicUsize::new(0),
            visited: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn content_flags(&self) -> ContentFlags {
        self.content_flags
    }

    pub fn phase(&self) -> CrawlPhase {
        CrawlPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase(),
            cancelled: self.is_cancelled(),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            queued: self.queued.load(Ordering::SeqCst),
            visited: self.visited.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
        }
    }

    /// Zeroes every counter and returns the phase to `Idle`
    pub(crate) fn reset(&self) {
        self.phase.store(CrawlPhase::Idle.to_u8(), Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
        self.in_flight.store(0, Ordering::SeqCst);
        self.peak_in_flight.store(0, Ordering::SeqCst);
        self.queued.store(0, Ordering::SeqCst);
        self.visited.store(0, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
    }

    /// Moves the run to `next`, rejecting illegal transitions
    pub(crate) fn transition(&self, next: CrawlPhase) -> Result<(), GleanError> {
        let current = self.phase();
        if current == next {
            return Ok(());
        }
        if !current.can_transition_to(next) {
            return Err(GleanError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.phase.store(next.to_u8(), Ordering::SeqCst);
        tracing::debug!("Run phase {} -> {}", current, next);
        Ok(())
    }

    pub(crate) fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Records a newly claimed URL entering the frontier
    pub(crate) fn record_enqueued(&self) {
        self.visited.fetch_add(1, Ordering::SeqCst);
        self.queued.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a unit leaving the frontier and starting its fetch
    pub(crate) fn record_dispatched(&self) {
        self.queued.fetch_sub(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    /// Records a unit finishing, whatever its outcome
    pub(crate) fn record_completed(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Frontier was cleared; nothing is queued any more
    pub(crate) fn clear_queued(&self) {
        self.queued.store(0, Ordering::SeqCst);
    }
}
