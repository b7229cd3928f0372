//! Historical rate series

use chrono::Duration;
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::common::errors::{Result, SimError};
use crate::common::types::Timestamp;

/// Rate series for every tradable asset, keyed by symbol
pub type RateTable = IndexMap<String, RateSeries>;

/// Prices of one asset in collateral units, ordered by time
///
/// Timestamps are strictly increasing. Lookups by row are O(1), lookups by
/// timestamp are a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSeries {
    timestamps: Vec<Timestamp>,
    prices: Vec<Decimal>,
}

impl RateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from `(timestamp, price)` points
    ///
    /// Fails with [`SimError::UnorderedRates`] unless the timestamps are
    /// strictly increasing, and with [`SimError::InvalidPrice`] on a negative
    /// price.
    pub fn from_points<I>(asset: &str, points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Timestamp, Decimal)>,
    {
        let mut series = Self::new();
        for (timestamp, price) in points {
            series.push(asset, timestamp, price)?;
        }
        Ok(series)
    }

    /// Build a gapless series starting at `start` with a fixed `step`
    ///
    /// Checked like [`RateSeries::from_points`], so `step` must be positive.
    pub fn from_prices(
        asset: &str,
        start: Timestamp,
        step: Duration,
        prices: &[Decimal],
    ) -> Result<Self> {
        let timestamps = (0..prices.len()).map(|i| start + step * i as i32);
        Self::from_points(asset, timestamps.zip(prices.iter().copied()))
    }

    /// Append a point at the end of the series
    ///
    /// A zero price is accepted: the asset can still be sold, for nothing.
    pub fn push(&mut self, asset: &str, timestamp: Timestamp, price: Decimal) -> Result<()> {
        if price < Decimal::ZERO {
            return Err(SimError::InvalidPrice {
                asset: asset.to_string(),
                timestamp,
                price,
            });
        }
        if let Some(last) = self.last_timestamp() {
            if timestamp <= last {
                return Err(SimError::UnorderedRates {
                    asset: asset.to_string(),
                    timestamp,
                });
            }
        }

        self.timestamps.push(timestamp);
        self.prices.push(price);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Price at a row
    pub fn price(&self, row: usize) -> Option<Decimal> {
        self.prices.get(row).copied()
    }

    /// Timestamp at a row
    pub fn timestamp(&self, row: usize) -> Option<Timestamp> {
        self.timestamps.get(row).copied()
    }

    pub fn prices(&self) -> &[Decimal] {
        &self.prices
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// Row holding exactly this timestamp
    pub fn position(&self, timestamp: Timestamp) -> Option<usize> {
        self.timestamps.binary_search(&timestamp).ok()
    }

    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.position(timestamp).is_some()
    }

    /// Points with `start <= timestamp <= end`
    pub fn slice_range(&self, start: Timestamp, end: Timestamp) -> Self {
        let from = self.timestamps.partition_point(|ts| *ts < start);
        let to = self.timestamps.partition_point(|ts| *ts <= end).max(from);
        self.slice_rows(from, to)
    }

    /// The last `count` points (the whole series if it is shorter)
    pub fn tail(&self, count: usize) -> Self {
        let from = self.len().saturating_sub(count);
        self.slice_rows(from, self.len())
    }

    fn slice_rows(&self, from: usize, to: usize) -> Self {
        Self {
            timestamps: self.timestamps[from..to].to_vec(),
            prices: self.prices[from..to].to_vec(),
        }
    }

    /// Iterate over `(timestamp, price)` points
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Decimal)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.prices.iter().copied())
    }
}
