//! Ready-made strategies, used by the command line runner and as baselines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{Result, SimError};
use crate::common::types::Wallet;
use crate::market::MarketData;
use crate::strategy::fees::{Fee, FeeSchedule};
use crate::strategy::traits::{Execution, Strategy};

/// Never trades; the wallet just follows the market
#[derive(Debug, Clone)]
pub struct HoldStrategy {
    market: MarketData,
}

impl HoldStrategy {
    pub fn new(market: MarketData) -> Self {
        Self { market }
    }
}

impl Strategy for HoldStrategy {
    type Args = ();

    fn name(&self) -> &str {
        "hold"
    }

    fn market(&self) -> &MarketData {
        &self.market
    }

    fn trade(&mut self, _asset: &str, _timestep: usize, _wallet: &mut Wallet, _args: &()) -> Result<()> {
        Ok(())
    }
}

/// Parameters of [`DollarCostAverage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcaParams {
    /// Collateral spent on each asset per purchase
    pub amount: Decimal,
    /// Timesteps between purchases; the first purchase happens at timestep 1
    #[serde(default = "default_interval")]
    pub interval: usize,
}

fn default_interval() -> usize {
    1
}

impl DcaParams {
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(SimError::Configuration(format!(
                "dca amount must not be negative, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Buys a fixed collateral amount of every asset at a fixed interval
#[derive(Debug, Clone)]
pub struct DollarCostAverage {
    market: MarketData,
    fees: FeeSchedule,
}

impl DollarCostAverage {
    pub fn new(market: MarketData) -> Self {
        Self::with_fees(market, FeeSchedule::Zero)
    }

    pub fn with_fees(market: MarketData, fees: FeeSchedule) -> Self {
        Self { market, fees }
    }
}

impl Strategy for DollarCostAverage {
    type Args = DcaParams;

    fn name(&self) -> &str {
        "dca"
    }

    fn market(&self) -> &MarketData {
        &self.market
    }

    fn calculate_fee(&self, asset: &str, _timestep: usize, amount: Decimal) -> Fee {
        self.fees.fee(asset, amount, self.market.index().collateral())
    }

    fn trade(&mut self, asset: &str, timestep: usize, wallet: &mut Wallet, args: &DcaParams) -> Result<()> {
        if timestep.saturating_sub(1) % args.interval.max(1) == 0 {
            self.buy(timestep, asset, args.amount, wallet)?;
        }
        Ok(())
    }
}

/// Parameters of [`Momentum`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumParams {
    /// Collateral spent when the price went up over the last step
    pub buy_amount: Decimal,
    /// Share of the holding sold when the price went down, between 0 and 1
    pub sell_fraction: Decimal,
}

impl MomentumParams {
    pub fn validate(&self) -> Result<()> {
        if self.buy_amount < Decimal::ZERO {
            return Err(SimError::Configuration(format!(
                "momentum buy_amount must not be negative, got {}",
                self.buy_amount
            )));
        }
        if self.sell_fraction < Decimal::ZERO || self.sell_fraction > Decimal::ONE {
            return Err(SimError::Configuration(format!(
                "momentum sell_fraction must be between 0 and 1, got {}",
                self.sell_fraction
            )));
        }
        Ok(())
    }
}

/// Follows the last price move: buys after a rise, sells after a fall
#[derive(Debug, Clone)]
pub struct Momentum {
    market: MarketData,
    fees: FeeSchedule,
}

impl Momentum {
    pub fn new(market: MarketData) -> Self {
        Self::with_fees(market, FeeSchedule::Zero)
    }

    pub fn with_fees(market: MarketData, fees: FeeSchedule) -> Self {
        Self { market, fees }
    }
}

impl Strategy for Momentum {
    type Args = MomentumParams;

    fn name(&self) -> &str {
        "momentum"
    }

    fn market(&self) -> &MarketData {
        &self.market
    }

    fn calculate_fee(&self, asset: &str, _timestep: usize, amount: Decimal) -> Fee {
        self.fees.fee(asset, amount, self.market.index().collateral())
    }

    fn trade(&mut self, asset: &str, timestep: usize, wallet: &mut Wallet, args: &MomentumParams) -> Result<()> {
        if timestep < 2 {
            return Ok(());
        }

        let previous = self.market.price_at_step(asset, timestep - 1)?;
        let current = self.market.price_at_step(asset, timestep)?;

        if current > previous {
            self.buy(timestep, asset, args.buy_amount, wallet)?;
        } else if current < previous {
            let position = self.market.index().asset_position(asset)?;
            let held = wallet.holdings()[position];
            self.sell(timestep, asset, held.saturating_mul(args.sell_fraction), wallet)?;
        }
        Ok(())
    }
}
