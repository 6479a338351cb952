//! Scheduler for managing the crawl frontier and concurrency slots
//!
//! This module handles:
//! - FIFO frontier of (url, depth) work items
//! - Depth, scope and dedup checks before anything is enqueued
//! - Global concurrency limiting via a semaphore
//! - Clearing the frontier on cancellation

use crate::state::RunState;
use crate::url::{DomainScope, VisitedSet};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    /// Normalized URL to fetch
    pub url: Url,

    /// Link hops from the seed (seed is 0)
    pub depth: u32,
}

/// FIFO queue of frontier items
///
/// The queue itself does no filtering; items are checked before `push`.
#[derive(Debug, Default)]
pub struct Frontier {
    items: VecDeque<FrontierItem>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: FrontierItem) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<FrontierItem> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every pending item, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }
}

/// A frontier item holding one of the concurrency slots
///
/// The slot is released when this value (or its permit) is dropped.
pub struct ScheduledFetch {
    pub item: FrontierItem,
    pub _permit: OwnedSemaphorePermit,
}

/// Why `Scheduler::offer` did not enqueue a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooDeep,
    OutOfScope,
    AlreadyClaimed,
}

/// Scheduler owns the frontier, the dedup set and the concurrency slots
///
/// The scheduler coordinates:
/// - Depth bound (`depth <= max_depth`)
/// - Optional domain scope for discovered links
/// - At-most-once enqueue per normalized URL
/// - At most `concurrency_limit` fetches in flight
pub struct Scheduler {
    /// One permit per concurrent fetch
    slots: Arc<Semaphore>,

    frontier: Frontier,
    visited: VisitedSet,
    scope: DomainScope,
    state: Arc<RunState>,
}

impl Scheduler {
    /// Creates a scheduler sized from the run state's concurrency limit
    pub fn new(state: Arc<RunState>, scope: DomainScope) -> Self {
        let slots = Arc::new(Semaphore::new(state.concurrency_limit().max(1)));
        Self {
            slots,
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            scope,
            state,
        }
    }

    /// Enqueues the seed at depth 0, bypassing the scope filter
    pub fn seed(&mut self, url: Url) -> bool {
        self.claim_and_push(FrontierItem { url, depth: 0 }).is_ok()
    }

    /// Enqueues a discovered URL if it passes depth, scope and dedup checks
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL was claimed and pushed
    /// * `Err(Rejection)` - Why it was not
    pub fn offer(&mut self, url: Url, depth: u32) -> Result<(), Rejection> {
        if depth > self.state.max_depth() {
            return Err(Rejection::TooDeep);
        }
        if !self.scope.allows(&url) {
            tracing::trace!("Out of scope: {}", url);
            return Err(Rejection::OutOfScope);
        }
        self.claim_and_push(FrontierItem { url, depth })
    }

    fn claim_and_push(&mut self, item: FrontierItem) -> Result<(), Rejection> {
        if !self.visited.try_claim(item.url.as_str()) {
            tracing::trace!("Already claimed: {}", item.url);
            return Err(Rejection::AlreadyClaimed);
        }
        tracing::trace!("Enqueued {} at depth {}", item.url, item.depth);
        self.frontier.push(item);
        self.state.record_enqueued();
        Ok(())
    }

    /// Pops the next item if a concurrency slot is free
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - An item holding a slot; counted as in flight
    /// * `None` - The frontier is empty or every slot is taken
    pub fn next_dispatch(&mut self) -> Option<ScheduledFetch> {
        if self.frontier.is_empty() {
            return None;
        }
        let permit = self.slots.clone().try_acquire_owned().ok()?;
        let item = self.frontier.pop()?;
        self.state.record_dispatched();
        Some(ScheduledFetch {
            item,
            _permit: permit,
        })
    }

    /// Clears the frontier so nothing else is dispatched
    pub fn cancel(&mut self) -> usize {
        let dropped = self.frontier.clear();
        self.state.clear_queued();
        dropped
    }

    /// Forgets every claim and pending item ahead of a new run
    pub fn reset(&mut self) {
        self.frontier.clear();
        self.visited.clear();
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of concurrency slots not currently held
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Distinct URLs claimed this run
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}
