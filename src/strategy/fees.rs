use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A transaction fee and the asset it is charged against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub amount: Decimal,
    /// Symbol of the fee-asset; may be the collateral symbol
    pub asset: String,
}

impl Fee {
    pub fn new(amount: Decimal, asset: impl Into<String>) -> Self {
        Self {
            amount,
            asset: asset.into(),
        }
    }

    /// No fee, charged against `asset`
    pub fn zero(asset: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, asset)
    }
}

/// Which balance pays a percentage fee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCurrency {
    /// The asset being bought or sold
    #[default]
    Traded,
    /// The collateral balance
    Collateral,
}

/// Fee policy a strategy can plug into `calculate_fee`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeSchedule {
    /// Free trading, charged against the traded asset
    #[default]
    Zero,
    /// A percentage of the traded amount
    ///
    /// The fee is `amount * percent / 100` in the units of the fee-asset, where
    /// `amount` is the argument of the buy or sell call (collateral for buys,
    /// asset units for sells).
    Percent {
        percent: Decimal,
        #[serde(default)]
        charged_in: FeeCurrency,
    },
}

impl FeeSchedule {
    /// Fee for trading `amount` of `asset` with `collateral` as the collateral symbol
    pub fn fee(&self, asset: &str, amount: Decimal, collateral: &str) -> Fee {
        match self {
            FeeSchedule::Zero => Fee::zero(asset),
            FeeSchedule::Percent {
                percent,
                charged_in,
            } => {
                // Too large to represent means too large to pay
                let fee = amount
                    .checked_mul(*percent)
                    .and_then(|gross| gross.checked_div(dec!(100)))
                    .unwrap_or(Decimal::MAX);
                match charged_in {
                    FeeCurrency::Traded => Fee::new(fee, asset),
                    FeeCurrency::Collateral => Fee::new(fee, collateral),
                }
            }
        }
    }
}
