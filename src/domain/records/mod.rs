// ============================================================
// RECORDS DOMAIN LAYER
// ============================================================
// Core types for the loaded record set and the queries over it
// No I/O, no async

mod policy;
mod query;
mod record_set;

pub use policy::{PaginationMode, RowLengthPolicy};
pub use query::{PageBounds, PageQuery, SchemaView};
pub use record_set::{RawRow, Record, RecordSet, SourceRow};
