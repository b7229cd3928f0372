//! Common test utilities and fixtures

#![allow(dead_code)]

use chrono::Duration;
use crypto_backtesting::{
    parse_timestamp, Execution, MarketData, RateSeries, RateTable, Result, Strategy, Timestamp,
    Wallet,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn ts(label: &str) -> Timestamp {
    parse_timestamp(label).expect("valid timestamp")
}

/// Daily series starting at `start`
pub fn daily(start: &str, prices: &[Decimal]) -> RateSeries {
    RateSeries::from_prices("TEST", ts(start), Duration::days(1), prices).unwrap()
}

/// BTC at 100, 110, 121 over three days
pub fn btc_rates() -> RateTable {
    let mut rates = RateTable::new();
    rates.insert(
        "BTC".to_string(),
        daily("2021-01-01", &[dec!(100), dec!(110), dec!(121)]),
    );
    rates
}

/// BTC and ETH over ten days, ending on the same day
pub fn two_asset_rates() -> RateTable {
    let mut rates = RateTable::new();
    rates.insert(
        "BTC".to_string(),
        daily(
            "2021-01-01",
            &[
                dec!(100), dec!(104), dec!(98), dec!(120), dec!(117),
                dec!(125), dec!(90), dec!(95), dec!(101), dec!(130),
            ],
        ),
    );
    rates.insert(
        "ETH".to_string(),
        daily(
            "2021-01-01",
            &[
                dec!(10), dec!(12), dec!(9), dec!(8), dec!(11),
                dec!(14), dec!(13), dec!(13), dec!(15), dec!(10),
            ],
        ),
    );
    rates
}

/// Scripted trades: `(timestep, asset, side, amount)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

pub type Script = Vec<(usize, &'static str, Side, Decimal)>;

/// Replays a fixed list of trades
pub struct Scripted {
    market: MarketData,
}

impl Scripted {
    pub fn new(market: MarketData) -> Self {
        Self { market }
    }
}

impl Strategy for Scripted {
    type Args = Script;

    fn name(&self) -> &str {
        "scripted"
    }

    fn market(&self) -> &MarketData {
        &self.market
    }

    fn trade(&mut self, asset: &str, timestep: usize, wallet: &mut Wallet, script: &Script) -> Result<()> {
        for (_, _, side, amount) in script
            .iter()
            .filter(|(t, a, _, _)| *t == timestep && *a == asset)
        {
            match side {
                Side::Buy => self.buy(timestep, asset, *amount, wallet)?,
                Side::Sell => self.sell(timestep, asset, *amount, wallet)?,
            };
        }
        Ok(())
    }
}

/// `collateral + Σ holding × price` at the start of `timestep`
pub fn expected_value(wallet: &Wallet, market: &MarketData, timestep: usize) -> Decimal {
    wallet.collateral()
        + market
            .index()
            .assets()
            .zip(wallet.holdings())
            .map(|(asset, amount)| *amount * market.price_at_step(asset, timestep).unwrap())
            .sum::<Decimal>()
}
