//! Strategy module for trade decision making
//!
//! This module provides the abstractions strategies are written against and
//! the execution primitives that apply their decisions to a wallet.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    POLICY (overridable)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Strategy::trade()          → decide how much to buy/sell   │
//! │  Strategy::calculate_fee()  → fee amount + fee-asset        │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LEDGER (sealed)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Execution::buy() / Execution::sell()                       │
//! │    - Looks up the fee and the start-of-step price           │
//! │    - Checks collateral, asset and fee-asset balances        │
//! │    - Applies the whole trade, or nothing                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Strategy`]: Trait for implementing trading strategies
//! - [`Execution`]: Buy/sell primitives, implemented for every strategy
//! - [`Fee`] and [`FeeSchedule`]: Transaction cost helpers
//! - [`HoldStrategy`], [`DollarCostAverage`], [`Momentum`]: Built-in policies

mod builtin;
mod fees;
mod traits;

pub use traits::{Execution, Strategy};

pub use fees::{Fee, FeeCurrency, FeeSchedule};

pub use builtin::{DcaParams, DollarCostAverage, HoldStrategy, Momentum, MomentumParams};
