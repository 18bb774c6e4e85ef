//! Cash flow series and CSV input loading

mod data;
pub mod loader;

pub use data::CashFlowSeries;
pub use loader::{load_series, load_series_from_reader, parse_amounts, LoadError};
