//! Error types for the backtester

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::Timestamp;

/// Result type alias using our SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Main error type for simulation setup and execution
#[derive(Error, Debug)]
pub enum SimError {
    /// Rate data and holdings do not line up
    #[error("Data mismatch! {0}")]
    DataMismatch(#[from] DataMismatch),

    /// `simulate` was invoked on a simulation that already ran
    #[error("Simulation has already been run; construct a new one to run again")]
    AlreadySimulated,

    /// A symbol that is neither collateral nor a tradable asset
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// The collateral symbol was used where a tradable asset is required
    #[error("Collateral {0} cannot be traded against itself")]
    CollateralNotTradable(String),

    /// Timestep outside of `1..=duration`
    #[error("Timestep {timestep} is outside of the simulation window 1..={duration}")]
    TimestepOutOfRange { timestep: usize, duration: usize },

    /// Negative trade amount or fee
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// A price that cannot be traded at (zero or negative)
    #[error("Invalid price {price} for {asset} at {timestamp}")]
    InvalidPrice {
        asset: String,
        timestamp: Timestamp,
        price: Decimal,
    },

    /// Unparseable timestamp label
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Rate series that is not strictly increasing in time
    #[error("Rates for {asset} are not strictly increasing at {timestamp}")]
    UnorderedRates { asset: String, timestamp: Timestamp },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Construction-time data alignment failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataMismatch {
    /// Rates and initial holdings name different assets
    #[error(
        "The strategy must have rates corresponding to each coin to trade, and each coin must \
         have an initial value (missing rates: {missing_rates:?}, missing holdings: {missing_holdings:?})"
    )]
    AssetSet {
        missing_rates: Vec<String>,
        missing_holdings: Vec<String>,
    },

    /// The start timestamp is absent from at least one series
    #[error("The start datetime {start} has no associated rate for: {assets:?}")]
    MissingStart { start: Timestamp, assets: Vec<String> },

    /// No end timestamp was given and the series end on different timestamps
    #[error("The provided rates do not share a common end datetime; an explicit end datetime is required")]
    AmbiguousEnd,

    /// A series is shorter than the requested trailing duration
    #[error("Rates for {asset} hold {available} rows but the simulation needs {duration}")]
    InsufficientHistory {
        asset: String,
        available: usize,
        duration: usize,
    },

    /// Series of different lengths after slicing to the window
    #[error("Rates for {asset} hold {found} rows in the window, expected {expected}")]
    MisalignedWindow {
        asset: String,
        expected: usize,
        found: usize,
    },

    /// A timestamp window cannot be resolved without any rate series
    #[error("A timestamp window needs at least one asset with rates")]
    NoAssets,
}
