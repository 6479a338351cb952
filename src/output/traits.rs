//! Exporter trait and error types
//!
//! This module defines the interface every export format implements and the
//! errors an export can produce.

use crate::record::ResultSet;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type OutputResult<T> = Result<T, ExportError>;

/// Serializes a result set into one output format
///
/// Implementations are stateless; the same result set always renders to the
/// same bytes.
pub trait Exporter: Sync {
    /// MIME type of the rendered payload
    fn mime_type(&self) -> &'static str;

    /// File extension without the leading dot
    fn file_extension(&self) -> &'static str;

    /// Renders every record, in result-set order
    ///
    /// An empty result set renders successfully, usually to an empty or
    /// near-empty payload.
    fn render(&self, results: &ResultSet) -> OutputResult<Vec<u8>>;
}
