//! Configuration module - file and environment driven settings

pub mod loader;
pub mod types;

pub use loader::load_config;
pub use types::{AppConfig, AppSettings, DataConfig, SimulationConfig, StrategyConfig};
