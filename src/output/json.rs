//! JSON export: the result set as a bare array of page records

use crate::output::traits::{Exporter, OutputResult};
use crate::record::ResultSet;

pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, results: &ResultSet) -> OutputResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(results)?)
    }
}
