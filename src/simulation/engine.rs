//! Simulation time loop

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

use crate::common::errors::{DataMismatch, Result, SimError};
use crate::common::types::Wallet;
use crate::config::types::SimulationConfig;
use crate::market::{AssetIndex, MarketData, RateTable};
use crate::strategy::Strategy;

/// Lifecycle of a [`Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Built and validated, `simulate` not called yet
    Ready,
    /// `simulate` was called; the instance cannot run again
    Consumed,
}

/// Replays a strategy over historical rates
///
/// Each timestep starts from a copy of the previous wallet, lets the strategy
/// trade every asset in turn, then values the result at the prices of the
/// start of the step. A simulation runs once.
pub struct Simulation<S: Strategy> {
    strategy: S,
    assets: Vec<String>,
    duration: usize,
    wallets: Vec<Wallet>,
    state: SimulationState,
}

impl<S: Strategy> Simulation<S> {
    /// Validate the data, resolve the window and bind a strategy to it
    ///
    /// `build` receives the window-sliced market data and returns the strategy
    /// to run, so a strategy type is usually passed as its constructor:
    ///
    /// ```ignore
    /// let simulation = Simulation::new(rates, &config, HoldStrategy::new)?;
    /// ```
    ///
    /// Fails with [`SimError::DataMismatch`] before anything is built if the
    /// rates and holdings name different assets or the window cannot be
    /// resolved.
    pub fn new<F>(rates: RateTable, config: &SimulationConfig, build: F) -> Result<Self>
    where
        F: FnOnce(MarketData) -> S,
    {
        check_asset_sets(&rates, config)?;
        let index = AssetIndex::new(&config.collateral_symbol, config.holdings.keys())?;
        let (sliced, duration) = config.window.resolve(&rates)?;

        let assets: Vec<String> = index.assets().map(str::to_string).collect();
        let market = MarketData::new(index, sliced, duration)?;

        let seed = Wallet::seed(
            config.starting_collateral,
            config.holdings.values().copied().collect(),
        );

        let strategy = build(market);
        info!(
            strategy = strategy.name(),
            assets = assets.len(),
            duration,
            starting_collateral = %config.starting_collateral,
            "Simulation ready"
        );

        Ok(Self {
            strategy,
            assets,
            duration,
            wallets: vec![seed],
            state: SimulationState::Ready,
        })
    }

    /// Run the strategy over every timestep of the window
    ///
    /// `args` is handed to every `trade` call. Returns the wallet history,
    /// seed included, with `duration + 1` entries. A second call fails with
    /// [`SimError::AlreadySimulated`]; if the strategy fails, the error is
    /// returned and the history stops at the last completed timestep.
    #[instrument(skip_all, fields(strategy = %self.strategy.name(), duration = self.duration))]
    pub fn simulate(&mut self, args: &S::Args) -> Result<&[Wallet]> {
        if self.state == SimulationState::Consumed {
            return Err(SimError::AlreadySimulated);
        }
        self.state = SimulationState::Consumed;

        for timestep in 1..=self.duration {
            let mut wallet = self.wallets[timestep - 1].clone();

            for asset in &self.assets {
                self.strategy.trade(asset, timestep, &mut wallet, args)?;
            }

            wallet.revalue(self.strategy.market().step_prices(timestep)?);
            debug!(timestep, value = %wallet.value(), "Timestep valued");

            self.wallets.push(wallet);
        }

        info!(
            final_value = %self.final_value(),
            "Simulation complete"
        );
        Ok(&self.wallets)
    }

    /// Wallet history so far
    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    /// Take ownership of the wallet history
    pub fn into_wallets(self) -> Vec<Wallet> {
        self.wallets
    }

    /// Value of the latest wallet
    pub fn final_value(&self) -> Decimal {
        self.wallets
            .last()
            .map(Wallet::value)
            .unwrap_or_default()
    }

    /// Number of timesteps in the window
    pub fn duration(&self) -> usize {
        self.duration
    }

    /// Tradable assets in the order they are traded
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn market(&self) -> &MarketData {
        self.strategy.market()
    }
}

fn check_asset_sets(rates: &RateTable, config: &SimulationConfig) -> Result<()> {
    let with_rates: BTreeSet<&str> = rates.keys().map(String::as_str).collect();
    let with_holdings: BTreeSet<&str> = config.holdings.keys().map(String::as_str).collect();

    if with_rates == with_holdings {
        return Ok(());
    }

    Err(DataMismatch::AssetSet {
        missing_rates: with_holdings
            .difference(&with_rates)
            .map(|s| s.to_string())
            .collect(),
        missing_holdings: with_rates
            .difference(&with_holdings)
            .map(|s| s.to_string())
            .collect(),
    }
    .into())
}
