// ============================================================
// RECORD SET
// ============================================================
// Immutable, shareable collection of decoded rows

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One decoded data row keyed by lowercase header name.
///
/// A `BTreeMap` keeps JSON output in a stable, ascending key order.
pub type Record = BTreeMap<String, String>;

/// One undecoded row as produced by a row source, values in column order.
pub type RawRow = Vec<String>;

/// A raw row tagged with the input line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: u64,
    pub values: RawRow,
}

impl SourceRow {
    pub fn new(line: u64, values: RawRow) -> Self {
        Self { line, values }
    }
}

/// Ordered records plus the union of every key seen across them.
///
/// Cloning is cheap: both parts sit behind an `Arc`, so every HTTP worker
/// can hold its own handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Arc<Vec<Record>>,
    field_names: Arc<BTreeSet<String>>,
}

impl RecordSet {
    /// Build a record set and compute its field-name union once.
    pub fn new(records: Vec<Record>) -> Self {
        let field_names = records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect::<BTreeSet<_>>();

        Self {
            records: Arc::new(records),
            field_names: Arc::new(field_names),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in source row order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Union of keys across all records, ascending.
    pub fn field_names(&self) -> &BTreeSet<String> {
        &self.field_names
    }
}
