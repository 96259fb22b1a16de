//! # Dataset Crate
//!
//! The adapter between the fundamentals sheet on disk and the rest of the
//! workspace. It turns a CSV export into an immutable, in-memory `Dataset`
//! and answers the catalogue questions selection controls need (which
//! sectors, years, quarters and symbols exist, and which period is newest).
//!
//! ## Public API
//!
//! - `load_csv` / `read_csv`: build a `Dataset` from a path or any reader.
//! - `Dataset`: the read-only table plus catalogue queries.
//! - `DatasetError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod table;
pub mod error;
pub mod loader;

// Re-export the key components to create a clean, public-facing API.
pub use table::{Catalog, Dataset, RowError};
pub use error::DatasetError;
pub use loader::{load_csv, read_csv};
