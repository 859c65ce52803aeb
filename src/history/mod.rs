//! Historical irradiance sources: uploaded CSV files and synthetic data

pub mod loader;
pub mod synthetic;

pub use loader::{load_csv, DataFormatError, HistoryFormat, LoadedHistory};
