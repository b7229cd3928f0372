//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{Result, SimError};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "BACKTEST";

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with BACKTEST__, e.g. `BACKTEST__SETTINGS__LOG_LEVEL`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| SimError::Configuration(e.to_string()))?;

    let config: AppConfig = config
        .try_deserialize()
        .map_err(|e| SimError::Configuration(e.to_string()))?;
    config.strategy.validate()?;

    Ok(config)
}
