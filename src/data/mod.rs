//! Historical price data
//!
//! Loads per-instrument daily bars and normalizes them into return series.

pub mod loader;
pub mod series;

pub use loader::{load_series, load_universe, parse_series, series_path, DailyBar};
pub use series::{InstrumentSeries, ReturnRecord, Universe};
