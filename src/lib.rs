//! Crypto Backtesting Library
//!
//! A discrete-time backtester that replays a pluggable trading strategy over
//! historical rates of assets priced in a stable collateral unit, and records
//! the wallet after every timestep.

pub mod common;
pub mod config;
pub mod market;
pub mod simulation;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{DataMismatch, Result, SimError};
pub use common::types::{parse_timestamp, Slot, Timestamp, Wallet, DEFAULT_COLLATERAL};
pub use config::types::{AppConfig, SimulationConfig, StrategyConfig};
pub use market::{AssetIndex, MarketData, RateSeries, RateTable};
pub use simulation::{Simulation, SimulationState, Window};

// Strategy types
pub use strategy::{
    DcaParams, DollarCostAverage, Execution, Fee, FeeCurrency, FeeSchedule, HoldStrategy,
    Momentum, MomentumParams, Strategy,
};
