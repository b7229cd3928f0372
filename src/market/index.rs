//! Asset symbol to wallet slot mapping

use indexmap::IndexSet;

use crate::common::errors::{Result, SimError};
use crate::common::types::Slot;

/// Maps symbols to wallet slots
///
/// The collateral symbol always maps to [`Slot::Collateral`]. Tradable assets
/// map to [`Slot::Asset`] in the order they were given, which is also the order
/// strategies are invoked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIndex {
    collateral: String,
    assets: IndexSet<String>,
}

impl AssetIndex {
    /// Build the index
    ///
    /// Fails if the collateral symbol is also listed as a tradable asset.
    pub fn new<I, S>(collateral: impl Into<String>, assets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collateral = collateral.into();
        let assets: IndexSet<String> = assets.into_iter().map(Into::into).collect();

        if assets.contains(&collateral) {
            return Err(SimError::CollateralNotTradable(collateral));
        }

        Ok(Self { collateral, assets })
    }

    /// Collateral symbol
    pub fn collateral(&self) -> &str {
        &self.collateral
    }

    /// Number of tradable assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Tradable asset symbols in slot order
    pub fn assets(&self) -> impl Iterator<Item = &str> + '_ {
        self.assets.iter().map(String::as_str)
    }

    /// Slot of any known symbol, collateral included
    pub fn slot(&self, symbol: &str) -> Option<Slot> {
        if symbol == self.collateral {
            Some(Slot::Collateral)
        } else {
            self.assets.get_index_of(symbol).map(Slot::Asset)
        }
    }

    /// Position of a tradable asset
    pub fn asset_position(&self, symbol: &str) -> Result<usize> {
        if symbol == self.collateral {
            return Err(SimError::CollateralNotTradable(symbol.to_string()));
        }

        self.assets
            .get_index_of(symbol)
            .ok_or_else(|| SimError::UnknownAsset(symbol.to_string()))
    }
}
