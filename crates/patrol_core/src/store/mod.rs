mod file;
mod parse;

use std::collections::HashMap;

use crate::record::{Record, key_text};

pub use file::{WriteStrategy, load, save};
pub use parse::{DroppedRecord, LoadReport, LoadedDocument, ParseWarning, parse_document};

pub type RecordKey = String;

/// Keyed records in first-insertion order.
///
/// Replacing an existing key keeps the entry where it was first inserted, so
/// serialization order never depends on later overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    entries: Vec<(RecordKey, Record)>,
    index: HashMap<RecordKey, usize>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or replaces. Returns the previous record under `key`, if any.
    pub fn insert(&mut self, key: RecordKey, record: Record) -> Option<Record> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, record));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, record));
        None
    }

    /// Derives a key for `record` against the current contents and inserts it.
    /// Records with neither `id` nor `type` are not inserted.
    pub fn insert_derived(&mut self, record: Record) -> Option<RecordKey> {
        let key = self.derive_key(&record)?;
        self.insert(key.clone(), record);
        Some(key)
    }

    /// `id` wins; otherwise `{type}_{n}` where `n` counts keys already
    /// starting with `{type}_`.
    pub fn derive_key(&self, record: &Record) -> Option<RecordKey> {
        if let Some(id) = record.id() {
            return Some(key_text(id));
        }
        let kind = key_text(record.record_type()?);
        let prefix = format!("{kind}_");
        Some(format!("{prefix}{}", self.count_with_prefix(&prefix)))
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.keys().filter(|k| k.starts_with(prefix)).count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Record)> {
        self.entries.iter_mut().map(|(k, r)| (k.as_str(), r))
    }

    /// One compact JSON line per record, each newline-terminated.
    pub fn to_document_text(&self) -> String {
        let mut out = String::new();
        for record in self.records() {
            out.push_str(&record.to_compact_line());
            out.push('\n');
        }
        out
    }
}
