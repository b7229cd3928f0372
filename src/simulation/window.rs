//! Simulation window resolution

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::common::errors::{DataMismatch, Result};
use crate::common::types::{timestamp_format, Timestamp};
use crate::market::RateTable;

/// Which part of the rate data a simulation replays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Window {
    /// From `start` to `end`, both inclusive
    ///
    /// Every series must hold a rate at `start`. Without an `end` the window
    /// runs to the end of the data, which must then be the same for every
    /// series.
    Range {
        #[serde(with = "timestamp_format")]
        start: Timestamp,
        #[serde(default, with = "timestamp_format::option")]
        end: Option<Timestamp>,
    },
    /// The last `duration` rows of every series
    ///
    /// The base unit of time is the resolution of the data: 365 rows are a year
    /// of daily rates but only about two weeks of hourly ones.
    Trailing { duration: usize },
}

impl Window {
    pub fn range(start: Timestamp, end: Option<Timestamp>) -> Self {
        Self::Range { start, end }
    }

    pub fn trailing(duration: usize) -> Self {
        Self::Trailing { duration }
    }

    /// Slice every series down to this window
    ///
    /// Returns the sliced table and the number of timesteps it covers.
    pub(crate) fn resolve(&self, rates: &RateTable) -> Result<(RateTable, usize)> {
        match self {
            Window::Range { start, end } => resolve_range(rates, *start, *end),
            Window::Trailing { duration } => resolve_trailing(rates, *duration),
        }
    }
}

fn resolve_range(
    rates: &RateTable,
    start: Timestamp,
    end: Option<Timestamp>,
) -> Result<(RateTable, usize)> {
    if rates.is_empty() {
        return Err(DataMismatch::NoAssets.into());
    }

    let missing: Vec<String> = rates
        .iter()
        .filter(|(_, series)| !series.contains(start))
        .map(|(asset, _)| asset.clone())
        .collect();
    if !missing.is_empty() {
        return Err(DataMismatch::MissingStart {
            start,
            assets: missing,
        }
        .into());
    }

    let end = match end {
        Some(end) => end,
        None => {
            let ends: BTreeSet<_> = rates.values().map(|s| s.last_timestamp()).collect();
            match ends.into_iter().collect::<Vec<_>>().as_slice() {
                [Some(end)] => *end,
                _ => return Err(DataMismatch::AmbiguousEnd.into()),
            }
        }
    };

    let sliced: RateTable = rates
        .iter()
        .map(|(asset, series)| (asset.clone(), series.slice_range(start, end)))
        .collect();

    let duration = sliced.values().next().map(|s| s.len()).unwrap_or_default();
    ensure_aligned(&sliced, duration)?;

    debug!(%start, %end, duration, "Resolved range window");
    Ok((sliced, duration))
}

fn resolve_trailing(rates: &RateTable, duration: usize) -> Result<(RateTable, usize)> {
    if let Some((asset, series)) = rates.iter().find(|(_, s)| s.len() < duration) {
        return Err(DataMismatch::InsufficientHistory {
            asset: asset.clone(),
            available: series.len(),
            duration,
        }
        .into());
    }

    let sliced = rates
        .iter()
        .map(|(asset, series)| (asset.clone(), series.tail(duration)))
        .collect();

    debug!(duration, "Resolved trailing window");
    Ok((sliced, duration))
}

fn ensure_aligned(sliced: &RateTable, duration: usize) -> Result<()> {
    match sliced.iter().find(|(_, s)| s.len() != duration) {
        Some((asset, series)) => Err(DataMismatch::MisalignedWindow {
            asset: asset.clone(),
            expected: duration,
            found: series.len(),
        }
        .into()),
        None => Ok(()),
    }
}
