//! Uploaded-file batch ingestion.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ordertally_catalog::OrderLine;
use ordertally_core::ProductId;

use crate::order_line::parse_order_line;

/// One uploaded CSV file: display name plus raw text contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvFile {
    pub name: String,
    pub contents: String,
}

impl CsvFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Parse every uploaded file and flatten the results into one record batch.
///
/// Records are rejected individually: a malformed or unreadable record drops
/// with a trace and the batch continues. There is no header handling; every
/// record is read position-for-position.
pub fn parse_files(files: &[CsvFile]) -> Vec<(ProductId, OrderLine)> {
    let mut batch = Vec::new();
    for file in files {
        batch.extend(parse_file(file));
    }
    batch
}

fn parse_file(file: &CsvFile) -> Vec<(ProductId, OrderLine)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file.contents.as_bytes());

    let mut parsed = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!(file = %file.name, record = index + 1, %err, "dropping unreadable record");
                continue;
            }
        };

        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        match parse_order_line(&fields) {
            Some(entry) => parsed.push(entry),
            None => {
                debug!(file = %file.name, record = index + 1, "dropping malformed order line");
            }
        }
    }
    parsed
}
