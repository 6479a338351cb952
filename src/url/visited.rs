use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The set of normalized URLs claimed during one crawl run
///
/// A URL is claimed at most once per run. `try_claim` performs the membership
/// check and the insertion under one lock, so two concurrent discoveries of the
/// same link cannot both win the claim.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims a URL
    ///
    /// Returns true iff this call inserted the URL, i.e. the caller now owns
    /// enqueueing it.
    pub fn try_claim(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    /// Returns true if the URL has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every claim; called when a new run starts
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the set half-updated
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
