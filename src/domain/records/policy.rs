// ============================================================
// LOADING AND PAGINATION POLICIES
// ============================================================

use serde::{Deserialize, Serialize};

/// What the loader does when a data row and the header differ in length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLengthPolicy {
    /// Zip up to the shorter length. Extra values are dropped and missing
    /// trailing fields are left out of the record.
    #[default]
    Truncate,

    /// Drop extra values; fill missing trailing fields with "".
    Pad,

    /// Fail the whole load on the first mismatched row.
    Reject,
}

/// How the `limit` of a page query is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// `limit` is an absolute, exclusive end index: the page is
    /// `[offset, limit)`.
    #[default]
    EndIndex,

    /// `limit` is a page size: the page is `[offset, offset + limit)`,
    /// clamped to the end of the set.
    Count,
}

impl std::fmt::Display for RowLengthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowLengthPolicy::Truncate => write!(f, "truncate"),
            RowLengthPolicy::Pad => write!(f, "pad"),
            RowLengthPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl std::fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationMode::EndIndex => write!(f, "end_index"),
            PaginationMode::Count => write!(f, "count"),
        }
    }
}
