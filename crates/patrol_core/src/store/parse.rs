use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::RecordCollection;
use crate::record::Record;

/// A line that was not valid JSON. It is left out of the collection and is
/// therefore lost on the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// A valid JSON line that had no `id` and no `type`, or was not an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub line_number: usize,
    pub line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub warnings: Vec<ParseWarning>,
    pub dropped: Vec<DroppedRecord>,
}

impl LoadReport {
    /// True when saving would write back exactly what was parsed.
    pub fn is_lossless(&self) -> bool {
        self.warnings.is_empty() && self.dropped.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    pub records: RecordCollection,
    pub report: LoadReport,
}

pub fn parse_document(text: &str) -> LoadedDocument {
    let mut records = RecordCollection::new();
    let mut report = LoadReport::default();

    for (i, raw) in text.lines().enumerate() {
        let line_number = i + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let value = match serde_json::from_str::<JsonValue>(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(line_number, line = raw, "could not parse line: {e}");
                report.warnings.push(ParseWarning {
                    line_number,
                    line: raw.to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        match Record::from_value(value).and_then(|r| records.insert_derived(r)) {
            Some(key) => debug!(line_number, %key, "loaded record"),
            None => {
                debug!(line_number, "dropped record without id or type");
                report.dropped.push(DroppedRecord {
                    line_number,
                    line: raw.to_string(),
                });
            }
        }
    }

    LoadedDocument { records, report }
}
