// ============================================================
// QUERY TYPES
// ============================================================
// Per-request inputs and outputs of the dataset service

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Body of a page request. Both fields are optional and may hold any
/// integer; validation happens in the dataset service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset_or_default(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    /// A missing limit behaves like `0`, which normalizes to "whole set".
    pub fn limit_or_default(&self) -> i64 {
        self.limit.unwrap_or(0)
    }
}

/// Validated `[start, end)` bounds, always within the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: usize,
    pub end: usize,
}

impl PageBounds {
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Schema metadata: ordered field names and the total record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaView {
    pub fields: Vec<String>,
    pub record_count: usize,
}
