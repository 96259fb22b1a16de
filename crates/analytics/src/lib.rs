//! # Fundamentals Analytics
//!
//! This crate holds the query engine behind every dashboard: it narrows the
//! fundamentals table to a selection and summarises what is left.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   terminals or configuration. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every operation takes borrowed rows and returns a
//!   fresh value. Nothing here can fail, so there is no error type; an empty
//!   input simply produces an empty output.
//!
//! ## Public API
//!
//! - `Selection` / `SelectionBuilder`: the user's picks, as independent predicates.
//! - `apply_filters`: the rows that satisfy a selection.
//! - `aggregate`: one measure summarised per group, as a `Series`.
//! - `price_to_book_series`: per-group price-to-book ratios.
//! - `time_series`: one symbol's history for a quarter.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod filter;
pub mod selection;
pub mod timeseries;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{
    aggregate, display_series, price_to_book_series, scale_for_display, GroupValue, Series,
    SeriesPoint,
};
pub use filter::{apply_filters, apply_predicates};
pub use selection::{Choice, Predicate, Selection, SelectionBuilder, ValueRange};
pub use timeseries::{time_series, TimePoint, TimeSeries};
