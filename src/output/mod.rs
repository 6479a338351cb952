//! Output module for exporting crawl results
//!
//! This module handles:
//! - Serializing a result set as TXT, CSV, JSON or PDF
//! - Picking the exporter for a format name, falling back to TXT
//! - Writing the payload to `<directory>/<name>.<extension>`
//! - Printing end-of-run statistics

mod json;
mod pdf;
pub mod stats;
mod table;
mod text;
mod traits;

pub use json::JsonExporter;
pub use pdf::PdfExporter;
pub use stats::{format_report, print_report};
pub use table::CsvExporter;
pub use text::TextExporter;
pub use traits::{ExportError, Exporter, OutputResult};

use crate::record::ResultSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Csv,
    Json,
    Pdf,
}

static TEXT: TextExporter = TextExporter;
static CSV: CsvExporter = CsvExporter;
static JSON: JsonExporter = JsonExporter;
static PDF: PdfExporter = PdfExporter;

impl ExportFormat {
    /// Parses a format name, falling back to `Txt` for anything unknown
    ///
    /// # Example
    ///
    /// ```
    /// use gleaner::ExportFormat;
    ///
    /// assert_eq!(ExportFormat::from_name("CSV"), ExportFormat::Csv);
    /// assert_eq!(ExportFormat::from_name("docx"), ExportFormat::Txt);
    /// ```
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown export format '{}', using txt", name);
            Self::Txt
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }

    /// The exporter that implements this format
    pub fn exporter(&self) -> &'static dyn Exporter {
        match self {
            Self::Txt => &TEXT,
            Self::Csv => &CSV,
            Self::Json => &JSON,
            Self::Pdf => &PDF,
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Txt, Self::Csv, Self::Json, Self::Pdf]
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::Format(format!("unsupported format: {}", other))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered export, ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub payload: Vec<u8>,
    pub mime_type: &'static str,
    pub file_extension: &'static str,
}

impl ExportResult {
    /// `<stem>.<extension>`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.file_extension)
    }

    /// Writes the payload into `directory`, creating it if needed
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(ExportError)` - The directory or file could not be written
    pub fn write_to(&self, directory: &Path, stem: &str) -> OutputResult<PathBuf> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join(self.file_name(stem));
        std::fs::write(&path, &self.payload)?;
        tracing::info!(
            "Wrote {} bytes of {} to {}",
            self.payload.len(),
            self.mime_type,
            path.display()
        );
        Ok(path)
    }
}

/// Serializes the result set in the given format
///
/// An empty result set still exports successfully.
pub fn export(results: &ResultSet, format: ExportFormat) -> OutputResult<ExportResult> {
    let exporter = format.exporter();
    Ok(ExportResult {
        payload: exporter.render(results)?,
        mime_type: exporter.mime_type(),
        file_extension: exporter.file_extension(),
    })
}
