//! Read-only market context handed to strategies

use rust_decimal::Decimal;

use super::index::AssetIndex;
use super::rates::{RateSeries, RateTable};
use crate::common::errors::{Result, SimError};
use crate::common::types::Timestamp;

/// Rates sliced to the simulation window, bound to the asset index
///
/// Row `r` of every series is the price at the start of timestep `r + 1`.
#[derive(Debug, Clone)]
pub struct MarketData {
    index: AssetIndex,
    rates: Vec<RateSeries>,
    duration: usize,
}

impl MarketData {
    /// Bind window-sliced rates to an index
    ///
    /// `rates` must hold a series for every asset of the index, each with
    /// exactly `duration` rows.
    pub(crate) fn new(index: AssetIndex, mut rates: RateTable, duration: usize) -> Result<Self> {
        let rates = index
            .assets()
            .map(|asset| {
                rates
                    .swap_remove(asset)
                    .ok_or_else(|| SimError::UnknownAsset(asset.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            index,
            rates,
            duration,
        })
    }

    pub fn index(&self) -> &AssetIndex {
        &self.index
    }

    /// Number of timesteps in the window
    pub fn duration(&self) -> usize {
        self.duration
    }

    /// Sliced series of an asset
    pub fn series(&self, asset: &str) -> Option<&RateSeries> {
        self.index
            .asset_position(asset)
            .ok()
            .and_then(|i| self.rates.get(i))
    }

    /// Price an asset trades at during `timestep`
    ///
    /// Trades and valuations during timestep `t` use the price at row `t - 1`,
    /// the start of the step.
    pub fn price_at_step(&self, asset: &str, timestep: usize) -> Result<Decimal> {
        let position = self.index.asset_position(asset)?;
        let row = self.row(timestep)?;
        let series = &self.rates[position];

        series.price(row).ok_or(SimError::TimestepOutOfRange {
            timestep,
            duration: self.duration,
        })
    }

    /// Timestamp at the start of `timestep`, if any asset is traded
    pub fn timestamp_at_step(&self, timestep: usize) -> Option<Timestamp> {
        let row = self.row(timestep).ok()?;
        self.rates.first().and_then(|series| series.timestamp(row))
    }

    /// Prices of every asset for `timestep`, in slot order
    pub(crate) fn step_prices(&self, timestep: usize) -> Result<Vec<Decimal>> {
        let row = self.row(timestep)?;
        self.rates
            .iter()
            .map(|series| {
                series.price(row).ok_or(SimError::TimestepOutOfRange {
                    timestep,
                    duration: self.duration,
                })
            })
            .collect()
    }

    fn row(&self, timestep: usize) -> Result<usize> {
        if timestep == 0 || timestep > self.duration {
            return Err(SimError::TimestepOutOfRange {
                timestep,
                duration: self.duration,
            });
        }
        Ok(timestep - 1)
    }
}
