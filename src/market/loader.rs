//! Historical rate loader
//!
//! Rates are stored one file per asset, named `<SYMBOL>.csv`, with a header
//! row and two columns:
//!
//! ```text
//! timestamp,price
//! 2021-01-01 00:00:00,29374.15
//! 2021-01-01 01:00:00,29408.44
//! ```

use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

use super::rates::{RateSeries, RateTable};
use crate::common::errors::Result;
use crate::common::types::timestamp_format;
use crate::common::types::Timestamp;

#[derive(Debug, Deserialize)]
struct RateRecord {
    #[serde(with = "timestamp_format")]
    timestamp: Timestamp,
    price: Decimal,
}

/// Read a rate series for `asset` from CSV data
pub fn read_rates<R: Read>(asset: &str, reader: R) -> Result<RateSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut series = RateSeries::new();
    for record in reader.deserialize::<RateRecord>() {
        let record = record?;
        series.push(asset, record.timestamp, record.price)?;
    }

    Ok(series)
}

/// Load a rate series for `asset` from a CSV file
#[instrument(skip(path), fields(file = %path.as_ref().display()))]
pub fn load_rates_csv(asset: &str, path: impl AsRef<Path>) -> Result<RateSeries> {
    let file = std::fs::File::open(path.as_ref())?;
    let series = read_rates(asset, file)?;
    debug!("Loaded {} rate points", series.len());
    Ok(series)
}

/// Load `<SYMBOL>.csv` from `dir` for every symbol, keeping the given order
#[instrument(skip(dir, symbols), fields(rates_dir = %dir.as_ref().display()))]
pub fn load_rate_table<I, S>(dir: impl AsRef<Path>, symbols: I) -> Result<RateTable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dir = dir.as_ref();
    symbols
        .into_iter()
        .map(|symbol| {
            let symbol = symbol.as_ref();
            let path = dir.join(format!("{symbol}.csv"));
            load_rates_csv(symbol, path).map(|series| (symbol.to_string(), series))
        })
        .collect()
}
