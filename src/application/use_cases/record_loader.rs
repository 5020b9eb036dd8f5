// ============================================================
// RECORD LOADER USE CASE
// ============================================================
// Turn raw rows into a record set, first row = header template

use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::records::{RawRow, Record, RecordSet, RowLengthPolicy, SourceRow};

/// Builds a `RecordSet` from rows produced by a row source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLoader {
    policy: RowLengthPolicy,
}

impl RecordLoader {
    pub fn new(policy: RowLengthPolicy) -> Self {
        Self { policy }
    }

    /// Load rows into a record set.
    ///
    /// The first row is the header; its values are trimmed and lowercased to
    /// become field names. Every later row is zipped with the header by
    /// position, with length mismatches handled per `RowLengthPolicy`.
    /// The first row-source error aborts the load unchanged.
    pub fn load<I>(&self, rows: I) -> Result<RecordSet>
    where
        I: IntoIterator<Item = Result<SourceRow>>,
    {
        let mut rows = rows.into_iter();

        let header = match rows.next().transpose()? {
            Some(row) => normalize_header(&row.values),
            None => {
                debug!("Input has no header row; record set is empty");
                return Ok(RecordSet::default());
            }
        };

        let mut records = Vec::new();
        let mut mismatched = 0usize;

        for row in rows {
            let SourceRow { line, values } = row?;
            if values.len() != header.len() {
                if self.policy == RowLengthPolicy::Reject {
                    return Err(AppError::ParseError(format!(
                        "line {}: expected {} fields, found {}",
                        line,
                        header.len(),
                        values.len()
                    )));
                }
                debug!(line, expected = header.len(), found = values.len(), "Row length mismatch");
                mismatched += 1;
            }
            records.push(self.build_record(&header, values));
        }

        if mismatched > 0 {
            warn!(
                rows = mismatched,
                policy = %self.policy,
                "Rows did not match the header length"
            );
        }

        Ok(RecordSet::new(records))
    }

    fn build_record(&self, header: &[String], row: RawRow) -> Record {
        let mut record: Record = header.iter().cloned().zip(row).collect();

        if self.policy == RowLengthPolicy::Pad {
            for name in header {
                record.entry(name.clone()).or_default();
            }
        }

        record
    }
}

fn normalize_header(row: &[String]) -> Vec<String> {
    row.iter().map(|name| name.trim().to_lowercase()).collect()
}
