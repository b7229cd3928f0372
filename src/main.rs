//! Crypto Backtesting - Main Entry Point
//!
//! Runs one of the built-in strategies over historical rates loaded from CSV
//! files and writes the resulting wallet history as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crypto_backtesting::config::load_config;
use crypto_backtesting::market::{load_rate_table, RateTable};
use crypto_backtesting::{
    DollarCostAverage, HoldStrategy, MarketData, Momentum, Simulation, SimulationConfig, Strategy,
    StrategyConfig, Wallet,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "backtest.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "BACKTEST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write the wallet history here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(Some(&args.config))
        .with_context(|| format!("failed to load configuration from {}", args.config))?;

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(config.settings.log_level.as_str());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting crypto backtesting");
    info!("Configuration file: {}", args.config);

    let simulation = &config.simulation;
    let rates = load_rate_table(&config.data.rates_dir, simulation.holdings.keys())
        .with_context(|| format!("failed to load rates from {}", config.data.rates_dir.display()))?;

    let wallets = match &config.strategy {
        StrategyConfig::Hold => run(rates, simulation, HoldStrategy::new, &())?,
        StrategyConfig::Dca { params, fees } => run(
            rates,
            simulation,
            |market: MarketData| DollarCostAverage::with_fees(market, fees.clone()),
            params,
        )?,
        StrategyConfig::Momentum { params, fees } => run(
            rates,
            simulation,
            |market: MarketData| Momentum::with_fees(market, fees.clone()),
            params,
        )?,
    };

    let history: Vec<_> = wallets.iter().map(Wallet::to_vec).collect();
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    if config.settings.pretty_output {
        serde_json::to_writer_pretty(&mut writer, &history)?;
    } else {
        serde_json::to_writer(&mut writer, &history)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    info!("Wrote {} wallets", history.len());
    Ok(())
}

/// Build a simulation for one strategy and run it
fn run<S, F>(
    rates: RateTable,
    config: &SimulationConfig,
    build: F,
    args: &S::Args,
) -> Result<Vec<Wallet>>
where
    S: Strategy,
    F: FnOnce(MarketData) -> S,
{
    let mut simulation = Simulation::new(rates, config, build)?;
    simulation.simulate(args)?;

    info!(
        strategy = simulation.strategy().name(),
        final_value = %simulation.final_value(),
        "Backtest finished"
    );
    Ok(simulation.into_wallets())
}
