//! # Core Types
//!
//! Layer 0 of the workspace: the fundamentals record, its identity types and
//! the enums every other crate speaks in. No I/O happens here.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AggregationMethod, BucketFilter, GroupKey, Measure, SortOrder};
pub use error::CoreError;
pub use structs::{coerce_decimal, parse_year, price_to_book, FundamentalsRecord, Period, Quarter};
