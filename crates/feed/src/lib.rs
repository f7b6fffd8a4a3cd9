//! Historical data feed for the tape replay engine.
//!
//! This crate handles:
//! - CSV series loading and fixed-point parsing
//! - Chronological multi-series merging
//! - The historical price source state machine

pub mod loader;
pub mod merge;
pub mod source;

pub use loader::{DateWindow, PriceRow};
pub use merge::{MergedRow, SeriesMerge};
pub use source::{HistoricCsvPriceSource, PriceSnapshot, PriceSource};
