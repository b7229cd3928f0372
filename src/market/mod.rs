//! Market module - historical rates and the asset slot mapping

pub mod data;
pub mod index;
pub mod loader;
pub mod rates;

pub use data::MarketData;
pub use index::AssetIndex;
pub use loader::{load_rate_table, load_rates_csv, read_rates};
pub use rates::{RateSeries, RateTable};
