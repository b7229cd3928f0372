//! Configuration types

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::errors::Result;
use crate::common::types::DEFAULT_COLLATERAL;
use crate::simulation::Window;
use crate::strategy::{DcaParams, FeeSchedule, MomentumParams};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// What to simulate
    pub simulation: SimulationConfig,
    /// Where the historical rates live
    #[serde(default)]
    pub data: DataConfig,
    /// Which built-in strategy to run
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Setup of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Symbol of the stable unit trades settle against
    #[serde(default = "default_collateral_symbol")]
    pub collateral_symbol: String,
    /// Collateral in the wallet at timestep 0
    pub starting_collateral: Decimal,
    /// Initial balance of every tradable asset; the order fixes the wallet layout
    #[serde(default, with = "holdings_format")]
    pub holdings: IndexMap<String, Decimal>,
    /// Part of the rate data to replay
    pub window: Window,
}

impl SimulationConfig {
    pub fn new(starting_collateral: Decimal, window: Window) -> Self {
        Self {
            collateral_symbol: default_collateral_symbol(),
            starting_collateral,
            holdings: IndexMap::new(),
            window,
        }
    }

    /// Add a tradable asset with its initial balance
    pub fn with_holding(mut self, asset: impl Into<String>, amount: Decimal) -> Self {
        self.holdings.insert(asset.into(), amount);
        self
    }

    pub fn with_collateral_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.collateral_symbol = symbol.into();
        self
    }
}

fn default_collateral_symbol() -> String {
    DEFAULT_COLLATERAL.to_string()
}

/// Holdings are written as a list of `{ asset, amount }` entries so their order
/// survives any configuration source
mod holdings_format {
    use indexmap::IndexMap;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Holding {
        asset: String,
        amount: Decimal,
    }

    pub fn serialize<S: Serializer>(
        holdings: &IndexMap<String, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(holdings.iter().map(|(asset, amount)| Holding {
            asset: asset.clone(),
            amount: *amount,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, Decimal>, D::Error> {
        let mut holdings = IndexMap::new();
        for Holding { asset, amount } in Vec::<Holding>::deserialize(deserializer)? {
            if holdings.insert(asset.clone(), amount).is_some() {
                return Err(serde::de::Error::custom(format!("duplicate holding for {asset}")));
            }
        }
        Ok(holdings)
    }
}

/// Location of the historical rate files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one `<SYMBOL>.csv` file per asset
    #[serde(default = "default_rates_dir")]
    pub rates_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            rates_dir: default_rates_dir(),
        }
    }
}

fn default_rates_dir() -> PathBuf {
    PathBuf::from("data/rates")
}

/// Built-in strategy selection and its parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Never trade
    #[default]
    Hold,
    /// Buy a fixed amount at a fixed interval
    Dca {
        #[serde(flatten)]
        params: DcaParams,
        #[serde(default)]
        fees: FeeSchedule,
    },
    /// Buy after rises, sell after falls
    Momentum {
        #[serde(flatten)]
        params: MomentumParams,
        #[serde(default)]
        fees: FeeSchedule,
    },
}

impl StrategyConfig {
    /// Reject parameters no run could use
    pub fn validate(&self) -> Result<()> {
        match self {
            StrategyConfig::Hold => Ok(()),
            StrategyConfig::Dca { params, .. } => params.validate(),
            StrategyConfig::Momentum { params, .. } => params.validate(),
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Pretty-print the JSON wallet history
    #[serde(default)]
    pub pretty_output: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pretty_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
