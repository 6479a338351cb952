//! Plain-text export
//!
//! One block per page, fields in the order title, url, text, images, links,
//! videos. Fields the run did not collect are left out.

use crate::output::traits::{Exporter, OutputResult};
use crate::record::{PageRecord, ResultSet};
use std::fmt::Write;

const SEPARATOR: &str = "----------------------------------------";

pub struct TextExporter;

impl Exporter for TextExporter {
    fn mime_type(&self) -> &'static str {
        "text/plain"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, results: &ResultSet) -> OutputResult<Vec<u8>> {
        Ok(render_text(results).into_bytes())
    }
}

/// Renders the whole result set as human-readable text
pub(crate) fn render_text(results: &ResultSet) -> String {
    let blocks: Vec<String> = results.iter().map(render_block).collect();
    blocks.join(&format!("\n{}\n\n", SEPARATOR))
}

fn render_block(record: &PageRecord) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    if let Some(title) = &record.title {
        let _ = writeln!(out, "Title: {}", title);
    }
    let _ = writeln!(out, "URL: {}", record.url);

    if let Some(text) = &record.text {
        let _ = write!(out, "\nText:\n{}\n", text);
    }
    write_list(&mut out, "Images", record.images.as_deref());
    write_list(&mut out, "Links", record.links.as_deref());
    write_list(&mut out, "Videos", record.videos.as_deref());

    out
}

fn write_list(out: &mut String, label: &str, items: Option<&[String]>) {
    if let Some(items) = items {
        let _ = writeln!(out, "\n{}:", label);
        for item in items {
            let _ = writeln!(out, "{}", item);
        }
    }
}
