//! Quant Report - Portfolio return and risk metrics library.
//!
//! This crate turns raw asset price series plus portfolio weights into a
//! fixed snapshot of performance statistics measured against a benchmark:
//!
//! - **Alignment**: Inner-join price series on common dates, derive returns
//! - **Composition**: Weighted portfolio return series
//! - **Metrics**: Cumulative/annualized return, Sharpe, Sortino, max drawdown, beta
//! - **Reporting**: Labelled (metric, value) rows persisted as CSV
//!
//! # Example
//!
//! ```rust,no_run
//! use quant_report::{compute_metrics, PriceSeries, WeightMap};
//! use std::collections::BTreeMap;
//!
//! # fn load() -> BTreeMap<String, PriceSeries> { BTreeMap::new() }
//! let prices = load();
//! let weights = WeightMap::from_pairs([("QQQ", 0.6), ("IEF", 0.4)]);
//!
//! let result = compute_metrics(&prices, &weights, "SPY", 0.03).unwrap();
//! println!("Sharpe: {:.2}", result.sharpe_ratio);
//! ```

pub mod config;
pub mod portfolio;
pub mod prices;
pub mod profiles;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, MetricsResult, PriceMap, PricePoint, PriceSeries, ReturnSeries, WeightMap,
};

// Re-export main functionality
pub use config::Settings;
pub use portfolio::{
    align_returns, beta, compose_portfolio, compute_metrics, compute_metrics_with,
    cumulative_return, cumulative_returns, geometric_annualized_return, max_drawdown,
    sharpe_ratio, sortino_ratio, AlignedReturns, MetricsOptions, TRADING_DAYS_PER_YEAR,
};
pub use profiles::{get_profile, list_profiles, resolve_profile, Profile, BUILTIN_PROFILES};
pub use report::MetricsReport;

/// Error types for quant-report operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Missing asset: {0}")]
    MissingAsset(String),

    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("Insufficient overlap: {overlap} common dates, need at least 2")]
    InsufficientOverlap { overlap: usize },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for quant-report operations.
pub type Result<T> = std::result::Result<T, Error>;
