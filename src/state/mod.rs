//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the run state machine (idle, running, draining, cancelled, finalized)
//! - `RunState`: atomic per-run counters owned by the coordinator
//! - `RunSnapshot`: a read-only copy of those counters

mod run_phase;
mod run_state;

// Re-export main types
pub use run_phase::CrawlPhase;
pub use run_state::{RunSnapshot, RunState};
