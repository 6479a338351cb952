/// Run phase definitions for the crawl state machine
///
/// A run moves `Idle -> Running -> (Draining | Cancelled) -> Finalized`.
/// `Draining` means the frontier is empty but fetches are still in flight;
/// a completion that discovers new links moves the run back to `Running`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No run started yet, or a finished run has been reset
    Idle,

    /// Dispatching work from the frontier
    Running,

    /// Frontier empty, waiting for in-flight fetches
    Draining,

    /// Cancellation requested; frontier cleared, in-flight fetches finishing
    Cancelled,

    /// Frontier empty and nothing in flight; results are ready for export
    Finalized,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase of a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Returns true if new fetches may be dispatched in this phase
    pub fn accepts_dispatch(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Draining)
                | (Draining, Running)
                | (Running, Cancelled)
                | (Draining, Cancelled)
                | (Running, Finalized)
                | (Draining, Finalized)
                | (Cancelled, Finalized)
                | (Finalized, Idle)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Cancelled => "cancelled",
            Self::Finalized => "finalized",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Draining => 2,
            Self::Cancelled => 3,
            Self::Finalized => 4,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Draining,
            3 => Self::Cancelled,
            4 => Self::Finalized,
            _ => Self::Idle,
        }
    }

    /// Returns all phases
    pub fn all_phases() -> [Self; 5] {
        [
            Self::Idle,
            Self::Running,
            Self::Draining,
            Self::Cancelled,
            Self::Finalized,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
