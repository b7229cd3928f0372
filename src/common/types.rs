//! Core types shared by the market, strategy and simulation layers

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::errors::{Result, SimError};

/// Time label of a rate point
///
/// Rates are indexed by naive date-times, usually `YYYY-MM-DD hh:mm:ss`.
pub type Timestamp = NaiveDateTime;

/// Collateral symbol used when none is configured
pub const DEFAULT_COLLATERAL: &str = "USDC";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp label
///
/// Accepts `YYYY-MM-DD hh:mm:ss` (optionally with fractional seconds or a `T`
/// separator), a bare `YYYY-MM-DD` date (midnight), or RFC 3339 with an offset,
/// which is normalized to UTC.
pub fn parse_timestamp(label: &str) -> Result<Timestamp> {
    let label = label.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(label, format) {
            return Ok(ts);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default());
    }

    DateTime::parse_from_rfc3339(label)
        .map(|dt| dt.naive_utc())
        .map_err(|_| SimError::InvalidTimestamp(label.to_string()))
}

/// Serde adapter for [`Timestamp`] labels using [`parse_timestamp`]
pub mod timestamp_format {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, Timestamp};

    const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let label = String::deserialize(deserializer)?;
        parse_timestamp(&label).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional labels
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::super::{parse_timestamp, Timestamp};

        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|label| parse_timestamp(&label).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Position of a balance inside a [`Wallet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The collateral balance, always first
    Collateral,
    /// A tradable asset, by its position in the asset order
    Asset(usize),
}

impl Slot {
    pub fn is_collateral(self) -> bool {
        matches!(self, Slot::Collateral)
    }
}

/// Snapshot of holdings at one timestep
///
/// Balances can be read by anyone but only changed through the execution
/// primitives, so a strategy cannot bypass the solvency checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    collateral: Decimal,
    holdings: Vec<Decimal>,
    value: Decimal,
}

impl Wallet {
    /// Create the starting wallet of a simulation
    ///
    /// The value is the collateral alone; initial holdings are not priced in
    /// until the first step is valued.
    pub fn seed(collateral: Decimal, holdings: Vec<Decimal>) -> Self {
        Self {
            collateral,
            holdings,
            value: collateral,
        }
    }

    /// Collateral balance
    pub fn collateral(&self) -> Decimal {
        self.collateral
    }

    /// Balances of the tradable assets, in asset order
    pub fn holdings(&self) -> &[Decimal] {
        &self.holdings
    }

    /// Total value in collateral units as of the last valuation
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Balance held in a slot
    ///
    /// # Panics
    /// If the slot is an asset position this wallet does not hold.
    pub fn balance(&self, slot: Slot) -> Decimal {
        match slot {
            Slot::Collateral => self.collateral,
            Slot::Asset(i) => self.holdings[i],
        }
    }

    pub(crate) fn balance_mut(&mut self, slot: Slot) -> &mut Decimal {
        match slot {
            Slot::Collateral => &mut self.collateral,
            Slot::Asset(i) => &mut self.holdings[i],
        }
    }

    /// Recompute the value from asset prices given in asset order
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub(crate) fn revalue<I>(&mut self, prices: I)
    where
        I: IntoIterator<Item = Decimal>,
    {
        self.value = self
            .holdings
            .iter()
            .zip(prices)
            .fold(self.collateral, |total, (amount, price)| {
                total.saturating_add(amount.saturating_mul(price))
            });
    }

    /// Flat `[collateral, asset_1, .., asset_n, value]` layout
    pub fn to_vec(&self) -> Vec<Decimal> {
        let mut flat = Vec::with_capacity(self.holdings.len() + 2);
        flat.push(self.collateral);
        flat.extend_from_slice(&self.holdings);
        flat.push(self.value);
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 0, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2021-03-04 05:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-04T05:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-04T05:00:00+00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-04T07:00:00+02:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2021-03-04").unwrap(),
            expected.date().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(SimError::InvalidTimestamp(label)) if label == "yesterday"
        ));
    }

    #[test]
    fn test_seed_wallet_ignores_holdings_value() {
        let wallet = Wallet::seed(dec!(1000), vec![dec!(2), dec!(3)]);

        assert_eq!(wallet.value(), dec!(1000));
        assert_eq!(
            wallet.to_vec(),
            vec![dec!(1000), dec!(2), dec!(3), dec!(1000)]
        );
    }

    #[test]
    fn test_revalue() {
        let mut wallet = Wallet::seed(dec!(500), vec![dec!(2), dec!(0.5)]);
        wallet.revalue([dec!(100), dec!(40)]);

        assert_eq!(wallet.value(), dec!(720));
    }

    #[test]
    fn test_revalue_saturates() {
        let mut wallet = Wallet::seed(dec!(1), vec![Decimal::MAX, dec!(1)]);
        wallet.revalue([dec!(2), dec!(3)]);

        assert_eq!(wallet.value(), Decimal::MAX);
    }

    #[test]
    fn test_slot_is_collateral() {
        assert!(Slot::Collateral.is_collateral());
        assert!(!Slot::Asset(0).is_collateral());
    }

    #[test]
    fn test_balance_mut() {
        let mut wallet = Wallet::seed(dec!(10), vec![dec!(1)]);
        *wallet.balance_mut(Slot::Asset(0)) += dec!(2);
        *wallet.balance_mut(Slot::Collateral) -= dec!(4);

        assert_eq!(wallet.balance(Slot::Asset(0)), dec!(3));
        assert_eq!(wallet.collateral(), dec!(6));
    }
}
