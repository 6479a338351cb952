//! CSV export
//!
//! The header is the union of fields present in any record, in canonical
//! order. Every value is quoted; embedded quotes are doubled. List fields are
//! joined with newlines inside their cell.

use crate::output::traits::{ExportError, Exporter, OutputResult};
use crate::record::{PageRecord, ResultSet};
use csv::{QuoteStyle, WriterBuilder};

/// Column names in output order
const COLUMNS: [&str; 6] = ["url", "title", "text", "images", "links", "videos"];

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn mime_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, results: &ResultSet) -> OutputResult<Vec<u8>> {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let columns = present_columns(results);
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());

        writer.write_record(columns.iter().map(|c| COLUMNS[*c]))?;
        for record in results {
            let cells = cells(record);
            writer.write_record(columns.iter().map(|c| cells[*c].as_deref().unwrap_or("")))?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }
}

/// Indexes into `COLUMNS` of fields present in at least one record
fn present_columns(results: &ResultSet) -> Vec<usize> {
    let mut present = [false; COLUMNS.len()];
    for record in results {
        for (slot, cell) in present.iter_mut().zip(cells(record)) {
            *slot |= cell.is_some();
        }
    }
    (0..COLUMNS.len()).filter(|i| present[*i]).collect()
}

fn cells(record: &PageRecord) -> [Option<String>; 6] {
    let join = |items: &Option<Vec<String>>| items.as_ref().map(|v| v.join("\n"));
    [
        Some(record.url.clone()),
        record.title.clone(),
        record.text.clone(),
        join(&record.images),
        join(&record.links),
        join(&record.videos),
    ]
}
