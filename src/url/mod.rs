//! URL handling module for Gleaner
//!
//! This module provides link resolution and normalization, the per-run dedup
//! set, and the optional domain scope that restricts which links are followed.

mod normalize;
mod scope;
mod visited;

pub use normalize::{normalize_url, resolve_href};
pub use scope::DomainScope;
pub use visited::VisitedSet;
