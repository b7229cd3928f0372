use rust_decimal::Decimal;
use tracing::trace;

use crate::common::errors::{Result, SimError};
use crate::common::types::{Slot, Timestamp, Wallet};
use crate::market::MarketData;
use crate::strategy::fees::Fee;

/// Core strategy trait
///
/// A strategy is bound to the market data of one simulation and is asked once
/// per asset per timestep what to trade. It expresses its decisions through the
/// [`Execution`] primitives, which every strategy gets for free and none can
/// replace.
///
/// # Example
///
/// ```ignore
/// struct BuyTheDip {
///     market: MarketData,
/// }
///
/// impl Strategy for BuyTheDip {
///     type Args = Decimal;
///
///     fn name(&self) -> &str { "buy_the_dip" }
///
///     fn market(&self) -> &MarketData { &self.market }
///
///     fn trade(&mut self, asset: &str, timestep: usize, wallet: &mut Wallet, amount: &Decimal) -> Result<()> {
///         if timestep > 1 && self.market.price_at_step(asset, timestep)? < self.market.price_at_step(asset, timestep - 1)? {
///             self.buy(timestep, asset, *amount, wallet)?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Strategy {
    /// Extra arguments passed through `Simulation::simulate` to every `trade` call,
    /// typically tunable hyperparameters
    type Args: ?Sized;

    /// Unique identifier for this strategy
    fn name(&self) -> &str;

    /// Market data this strategy is bound to
    fn market(&self) -> &MarketData;

    /// Fee for trading `amount` of `asset` during `timestep`
    ///
    /// Must be free of side effects; the execution primitives call it in the
    /// middle of a trade. Default is no fee, charged against the traded asset.
    fn calculate_fee(&self, asset: &str, _timestep: usize, _amount: Decimal) -> Fee {
        Fee::zero(asset)
    }

    /// Make zero or more buy/sell decisions for `asset` during `timestep`
    ///
    /// `wallet` is this timestep's working copy; earlier snapshots are never
    /// affected.
    fn trade(
        &mut self,
        asset: &str,
        timestep: usize,
        wallet: &mut Wallet,
        args: &Self::Args,
    ) -> Result<()>;
}

mod sealed {
    pub trait Sealed {}

    impl<S: super::Strategy + ?Sized> Sealed for S {}
}

/// Wallet mutation primitives available to every [`Strategy`]
///
/// Implemented once for all strategies and sealed, so the solvency rules
/// always hold whatever the strategy logic does. A trade the wallet cannot
/// afford is skipped: the call returns `Ok(false)` and the wallet is left
/// untouched. Errors are reserved for calls that can never succeed, such as an
/// unknown symbol or a timestep outside the window; they leave the wallet
/// untouched as well.
pub trait Execution: sealed::Sealed {
    /// Spend `amount` collateral on `asset` at the price of `timestep`
    fn buy(&self, timestep: usize, asset: &str, amount: Decimal, wallet: &mut Wallet)
        -> Result<bool>;

    /// Sell `amount` units of `asset` for collateral at the price of `timestep`
    fn sell(&self, timestep: usize, asset: &str, amount: Decimal, wallet: &mut Wallet)
        -> Result<bool>;
}

impl<S: Strategy + ?Sized> Execution for S {
    fn buy(
        &self,
        timestep: usize,
        asset: &str,
        amount: Decimal,
        wallet: &mut Wallet,
    ) -> Result<bool> {
        let fee = self.calculate_fee(asset, timestep, amount);
        let order = Order::prepare(self.market(), timestep, asset, amount, &fee)?;

        let collateral = wallet.collateral();
        let solvent = if order.fee_slot.is_collateral() {
            covers(collateral, amount, fee.amount)
        } else {
            collateral >= amount && wallet.balance(order.fee_slot) >= fee.amount
        };
        if !solvent {
            return Ok(false);
        }

        if order.price.is_zero() {
            return Err(SimError::InvalidPrice {
                asset: asset.to_string(),
                timestamp: order.timestamp,
                price: order.price,
            });
        }
        let Some(quantity) = amount.checked_div(order.price) else {
            return Ok(false);
        };

        let settled = settle(
            wallet,
            &[
                (order.fee_slot, -fee.amount),
                (Slot::Collateral, -amount),
                (order.asset_slot, quantity),
            ],
        );
        if !settled {
            return Ok(false);
        }

        trace!(
            strategy = self.name(),
            timestep,
            asset,
            %amount,
            %quantity,
            fee = %fee.amount,
            fee_asset = %fee.asset,
            "buy filled"
        );
        Ok(true)
    }

    fn sell(
        &self,
        timestep: usize,
        asset: &str,
        amount: Decimal,
        wallet: &mut Wallet,
    ) -> Result<bool> {
        let fee = self.calculate_fee(asset, timestep, amount);
        let order = Order::prepare(self.market(), timestep, asset, amount, &fee)?;

        let held = wallet.balance(order.asset_slot);
        let solvent = if order.fee_slot == order.asset_slot {
            covers(held, amount, fee.amount)
        } else {
            held >= amount && wallet.balance(order.fee_slot) >= fee.amount
        };
        if !solvent {
            return Ok(false);
        }

        let Some(proceeds) = amount.checked_mul(order.price) else {
            return Ok(false);
        };

        let settled = settle(
            wallet,
            &[
                (order.fee_slot, -fee.amount),
                (order.asset_slot, -amount),
                (Slot::Collateral, proceeds),
            ],
        );
        if !settled {
            return Ok(false);
        }

        trace!(
            strategy = self.name(),
            timestep,
            asset,
            %amount,
            %proceeds,
            fee = %fee.amount,
            fee_asset = %fee.asset,
            "sell filled"
        );
        Ok(true)
    }
}

/// Whether `balance` pays for `amount` plus `fee`
///
/// A cost too large to represent is never covered.
fn covers(balance: Decimal, amount: Decimal, fee: Decimal) -> bool {
    amount
        .checked_add(fee)
        .is_some_and(|cost| balance >= cost)
}

/// Apply balance changes all at once
///
/// Leaves the wallet untouched and returns `false` if any resulting balance
/// would overflow.
fn settle(wallet: &mut Wallet, changes: &[(Slot, Decimal)]) -> bool {
    let mut next = wallet.clone();
    for (slot, change) in changes {
        let balance = next.balance_mut(*slot);
        match balance.checked_add(*change) {
            Some(updated) => *balance = updated,
            None => return false,
        }
    }
    *wallet = next;
    true
}

/// Everything about a trade that does not depend on the wallet
struct Order {
    asset_slot: Slot,
    fee_slot: Slot,
    price: Decimal,
    timestamp: Timestamp,
}

impl Order {
    fn prepare(
        market: &MarketData,
        timestep: usize,
        asset: &str,
        amount: Decimal,
        fee: &Fee,
    ) -> Result<Self> {
        let index = market.index();
        let asset_slot = Slot::Asset(index.asset_position(asset)?);
        let fee_slot = index
            .slot(&fee.asset)
            .ok_or_else(|| SimError::UnknownAsset(fee.asset.clone()))?;

        if amount < Decimal::ZERO {
            return Err(SimError::InvalidAmount(amount));
        }
        if fee.amount < Decimal::ZERO {
            return Err(SimError::InvalidAmount(fee.amount));
        }

        let price = market.price_at_step(asset, timestep)?;
        let timestamp = market.timestamp_at_step(timestep).unwrap_or_default();

        Ok(Self {
            asset_slot,
            fee_slot,
            price,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::parse_timestamp;
    use crate::market::{AssetIndex, RateSeries, RateTable};
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Charges a fixed fee, never trades on its own
    struct FixedFee {
        market: MarketData,
        fee: Fee,
    }

    impl Strategy for FixedFee {
        type Args = ();

        fn name(&self) -> &str {
            "fixed_fee"
        }

        fn market(&self) -> &MarketData {
            &self.market
        }

        fn calculate_fee(&self, _asset: &str, _timestep: usize, _amount: Decimal) -> Fee {
            self.fee.clone()
        }

        fn trade(&mut self, _asset: &str, _timestep: usize, _wallet: &mut Wallet, _args: &()) -> Result<()> {
            Ok(())
        }
    }

    fn market() -> MarketData {
        let start = parse_timestamp("2021-01-01 00:00:00").unwrap();
        let mut rates = RateTable::new();
        rates.insert(
            "BTC".to_string(),
            RateSeries::from_prices("BTC", start, Duration::days(1), &[dec!(100), dec!(110), dec!(121)])
                .unwrap(),
        );
        rates.insert(
            "ETH".to_string(),
            RateSeries::from_prices("ETH", start, Duration::days(1), &[dec!(10), dec!(8), dec!(0)]).unwrap(),
        );
        let index = AssetIndex::new("USDC", ["BTC", "ETH"]).unwrap();
        MarketData::new(index, rates, 3).unwrap()
    }

    fn strategy(fee: Decimal, fee_asset: &str) -> FixedFee {
        FixedFee {
            market: market(),
            fee: Fee::new(fee, fee_asset),
        }
    }

    fn wallet_of(collateral: Decimal, btc: Decimal, eth: Decimal) -> Wallet {
        Wallet::seed(collateral, vec![btc, eth])
    }

    #[test]
    fn test_default_fee_is_zero_on_traded_asset() {
        let hold = crate::strategy::HoldStrategy::new(market());

        assert_eq!(hold.calculate_fee("ETH", 1, dec!(50)), Fee::zero("ETH"));
    }

    #[test]
    fn test_buy_uses_start_of_step_price() {
        let strategy = strategy(dec!(0), "BTC");
        let mut wallet = wallet_of(dec!(1000), dec!(0), dec!(0));

        assert!(strategy.buy(2, "BTC", dec!(220), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(780));
        assert_eq!(wallet.holdings(), &[dec!(2), dec!(0)]);
    }

    #[test]
    fn test_buy_with_collateral_fee() {
        let strategy = strategy(dec!(1.5), "USDC");
        let mut wallet = wallet_of(dec!(1000), dec!(0), dec!(3));

        assert!(strategy.buy(1, "BTC", dec!(100), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(898.5));
        assert_eq!(wallet.holdings(), &[dec!(1), dec!(3)]);
    }

    #[test]
    fn test_buy_with_other_asset_fee() {
        let strategy = strategy(dec!(0.5), "ETH");
        let mut wallet = wallet_of(dec!(100), dec!(0), dec!(2));

        assert!(strategy.buy(1, "BTC", dec!(100), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(0));
        assert_eq!(wallet.holdings(), &[dec!(1), dec!(1.5)]);
    }

    #[test]
    fn test_buy_collateral_fee_counts_towards_solvency() {
        let strategy = strategy(dec!(1), "USDC");
        let mut wallet = wallet_of(dec!(100), dec!(0), dec!(0));
        let before = wallet.clone();

        assert!(!strategy.buy(1, "BTC", dec!(100), &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_buy_insufficient_fee_asset() {
        let strategy = strategy(dec!(0.5), "ETH");
        let mut wallet = wallet_of(dec!(1000), dec!(0), dec!(0.4));
        let before = wallet.clone();

        assert!(!strategy.buy(1, "BTC", dec!(100), &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_sell_credits_collateral() {
        let strategy = strategy(dec!(0), "BTC");
        let mut wallet = wallet_of(dec!(0), dec!(3), dec!(0));

        assert!(strategy.sell(3, "BTC", dec!(2), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(242));
        assert_eq!(wallet.holdings(), &[dec!(1), dec!(0)]);
    }

    #[test]
    fn test_sell_with_same_asset_fee() {
        let strategy = strategy(dec!(0.1), "BTC");
        let mut wallet = wallet_of(dec!(0), dec!(1.1), dec!(0));

        assert!(strategy.sell(1, "BTC", dec!(1), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(100));
        assert_eq!(wallet.holdings(), &[dec!(0), dec!(0)]);

        // The fee must be covered on top of the amount sold
        let mut short = wallet_of(dec!(0), dec!(1.05), dec!(0));
        let before = short.clone();
        assert!(!strategy.sell(1, "BTC", dec!(1), &mut short).unwrap());
        assert_eq!(short, before);
    }

    #[test]
    fn test_sell_with_collateral_fee() {
        let strategy = strategy(dec!(2), "USDC");
        let mut wallet = wallet_of(dec!(2), dec!(1), dec!(0));

        assert!(strategy.sell(1, "BTC", dec!(1), &mut wallet).unwrap());
        assert_eq!(wallet.collateral(), dec!(100));

        let mut broke = wallet_of(dec!(1), dec!(1), dec!(0));
        let before = broke.clone();
        assert!(!strategy.sell(1, "BTC", dec!(1), &mut broke).unwrap());
        assert_eq!(broke, before);
    }

    #[test]
    fn test_sell_more_than_held_is_a_no_op() {
        let strategy = strategy(dec!(0), "ETH");
        let mut wallet = wallet_of(dec!(5), dec!(0), dec!(1));
        let before = wallet.clone();

        assert!(!strategy.sell(2, "ETH", dec!(1.0001), &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_unknown_symbols_fail_without_mutation() {
        let mut wallet = wallet_of(dec!(1000), dec!(1), dec!(1));
        let before = wallet.clone();

        assert!(matches!(
            strategy(dec!(0), "BTC").buy(1, "DOGE", dec!(1), &mut wallet),
            Err(SimError::UnknownAsset(symbol)) if symbol == "DOGE"
        ));
        assert!(matches!(
            strategy(dec!(1), "XRP").sell(1, "BTC", dec!(1), &mut wallet),
            Err(SimError::UnknownAsset(symbol)) if symbol == "XRP"
        ));
        assert!(matches!(
            strategy(dec!(0), "USDC").buy(1, "USDC", dec!(1), &mut wallet),
            Err(SimError::CollateralNotTradable(_))
        ));
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_invalid_calls_fail_without_mutation() {
        let strategy = strategy(dec!(0), "BTC");
        let mut wallet = wallet_of(dec!(1000), dec!(1), dec!(1));
        let before = wallet.clone();

        assert!(matches!(
            strategy.buy(0, "BTC", dec!(1), &mut wallet),
            Err(SimError::TimestepOutOfRange { timestep: 0, duration: 3 })
        ));
        assert!(matches!(
            strategy.sell(4, "BTC", dec!(1), &mut wallet),
            Err(SimError::TimestepOutOfRange { timestep: 4, duration: 3 })
        ));
        assert!(matches!(
            strategy.buy(1, "BTC", dec!(-1), &mut wallet),
            Err(SimError::InvalidAmount(_))
        ));
        assert!(matches!(
            strategy.buy(3, "ETH", dec!(1), &mut wallet),
            Err(SimError::InvalidPrice { asset, .. }) if asset == "ETH"
        ));
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_sell_at_zero_price_credits_nothing() {
        let strategy = strategy(dec!(0), "ETH");
        let mut wallet = wallet_of(dec!(5), dec!(0), dec!(2));

        assert!(strategy.sell(3, "ETH", dec!(1), &mut wallet).unwrap());

        assert_eq!(wallet.collateral(), dec!(5));
        assert_eq!(wallet.holdings(), &[dec!(0), dec!(1)]);
    }

    #[test]
    fn test_unaffordable_buy_at_zero_price_is_a_no_op() {
        let strategy = strategy(dec!(0), "ETH");
        let mut wallet = wallet_of(dec!(0), dec!(0), dec!(0));
        let before = wallet.clone();

        assert!(!strategy.buy(3, "ETH", dec!(5), &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_oversized_orders_are_no_ops() {
        let mut wallet = wallet_of(dec!(1000), dec!(2), dec!(2));
        let before = wallet.clone();

        assert!(!strategy(dec!(1), "USDC").buy(1, "ETH", Decimal::MAX, &mut wallet).unwrap());
        assert!(!strategy(dec!(1), "BTC").sell(1, "BTC", Decimal::MAX, &mut wallet).unwrap());
        assert!(!strategy(Decimal::MAX, "USDC").buy(1, "BTC", dec!(1), &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_overflowing_proceeds_are_a_no_op() {
        let strategy = strategy(dec!(0), "BTC");
        let mut wallet = wallet_of(Decimal::MAX, Decimal::MAX, dec!(0));
        let before = wallet.clone();

        assert!(!strategy.sell(1, "BTC", Decimal::MAX, &mut wallet).unwrap());
        assert_eq!(wallet, before);
    }
}
