// ============================================================
// DATASET SERVICE
// ============================================================
// Schema and pagination queries over the loaded record set

use crate::domain::error::{AppError, Result};
use crate::domain::records::{PageBounds, PageQuery, PaginationMode, Record, RecordSet, SchemaView};

/// Read-only query service over one record set.
///
/// The service never mutates the set, so one instance can be shared by
/// every request handler without locking.
#[derive(Debug, Clone)]
pub struct DatasetService {
    records: RecordSet,
    mode: PaginationMode,
}

impl DatasetService {
    pub fn new(records: RecordSet, mode: PaginationMode) -> Self {
        Self { records, mode }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Field names plus record count for the schema endpoint.
    pub fn schema(&self, filter_fields: &[String]) -> SchemaView {
        SchemaView {
            fields: self.derive_schema(filter_fields),
            record_count: self.records.len(),
        }
    }

    /// Field names across all records.
    ///
    /// With an empty filter the full union is returned in ascending order.
    /// Otherwise the filter's order is kept, names unknown to the set are
    /// dropped, and repeated names stay repeated.
    pub fn derive_schema(&self, filter_fields: &[String]) -> Vec<String> {
        let union = self.records.field_names();

        if filter_fields.is_empty() {
            return union.iter().cloned().collect();
        }

        filter_fields
            .iter()
            .filter(|name| union.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Records between the validated bounds of `query`, in source order.
    pub fn page(&self, query: &PageQuery) -> Result<&[Record]> {
        self.get_page(query.offset_or_default(), query.limit_or_default())
    }

    pub fn get_page(&self, offset: i64, limit: i64) -> Result<&[Record]> {
        let bounds = self.resolve_bounds(offset, limit)?;
        Ok(&self.records.records()[bounds.as_range()])
    }

    /// Validate `offset`/`limit` against the set size.
    ///
    /// `limit <= 0` or `limit > len` means "whole set". Everything is checked
    /// before a slice is taken.
    pub fn resolve_bounds(&self, offset: i64, limit: i64) -> Result<PageBounds> {
        let len = self.records.len();
        // A set larger than i64::MAX cannot exist in memory.
        let total = i64::try_from(len).unwrap_or(i64::MAX);

        let limit = if limit <= 0 || limit > total { total } else { limit };

        if offset < 0 {
            return Err(AppError::RangeError(format!(
                "offset {} must not be negative",
                offset
            )));
        }
        if offset > total {
            return Err(AppError::RangeError(format!(
                "offset {} is past the end of {} records",
                offset, total
            )));
        }

        let end = match self.mode {
            PaginationMode::EndIndex => {
                if offset > limit {
                    return Err(AppError::RangeError(format!(
                        "offset {} is greater than limit {}",
                        offset, limit
                    )));
                }
                limit
            }
            PaginationMode::Count => offset.saturating_add(limit).min(total),
        };

        // Both values are within [0, total] here.
        Ok(PageBounds {
            start: offset as usize,
            end: end as usize,
        })
    }
}
