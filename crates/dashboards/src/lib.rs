//! # Dashboards
//!
//! Turns a `Dataset` and a user's picks into chart data. Each dashboard is a
//! plain, serializable value: a list of `Chart`s with labelled points that any
//! front end (the CLI tables, a JSON consumer, a web page) can draw.
//!
//! ## Public API
//!
//! - `sector_dashboard`: per-symbol comparison within one sector.
//! - `symbol_dashboard`: one symbol's history for a quarter.
//! - `screener_dashboard`: rows of a period passing price, book and bucket screens.
//! - `measure_chart`: an ad-hoc aggregation of any measure.
//! - `bar_chart` / `ChartSpec`: the single chart builder behind them all.
//! - `DashboardError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod chart;
pub mod error;
pub mod format;
pub mod measure;
pub mod screener;
pub mod sector;
pub mod symbol;

// Re-export the key components to create a clean, public-facing API.
pub use chart::{bar_chart, series_points, Chart, ChartKind, ChartPoint, ChartRow, ChartSeries, ChartSpec, Mark};
pub use error::DashboardError;
pub use format::{to_json, ValueFormat};
pub use measure::{measure_chart, MeasureQuery};
pub use screener::{screener_dashboard, ScreenerDashboard, ScreenerRow};
pub use sector::{sector_dashboard, SectorDashboard, SectorQuery};
pub use symbol::{symbol_dashboard, SymbolDashboard, SymbolQuery};
