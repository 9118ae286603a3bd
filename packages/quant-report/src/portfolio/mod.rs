//! Portfolio metrics pipeline.
//!
//! Prices are aligned into per-asset returns, composed into a weighted portfolio
//! series, and reduced to a [`MetricsResult`] against a benchmark.

mod align;
mod compose;
mod performance;
mod risk;

pub use align::{align_returns, AlignedReturns};
pub use compose::compose_portfolio;
pub use performance::{
    cumulative_return, cumulative_returns, geometric_annualized_return, TRADING_DAYS_PER_YEAR,
};
pub use risk::{beta, max_drawdown, sharpe_ratio, sortino_ratio};

use crate::types::{normalize_asset, MetricsResult, PriceMap, WeightMap};
use crate::{Error, Result};

/// Tunables for [`compute_metrics_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsOptions {
    /// Periods per year used for the geometric annualized return
    pub periods_per_year: usize,
    /// Allowed deviation of the weight total from 1.0
    pub weight_tolerance: f64,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            weight_tolerance: 1e-6,
        }
    }
}

/// Compute the full metrics snapshot with default options.
///
/// # Arguments
///
/// * `prices` - Price series per asset; must contain every weighted asset and the benchmark
/// * `weights` - Fractional portfolio weights, expected to sum to 1
/// * `benchmark_id` - Asset the portfolio is compared against
/// * `risk_free_rate` - Annual risk-free rate (e.g., 0.03 for 3%)
pub fn compute_metrics(
    prices: &PriceMap,
    weights: &WeightMap,
    benchmark_id: &str,
    risk_free_rate: f64,
) -> Result<MetricsResult> {
    compute_metrics_with(
        prices,
        weights,
        benchmark_id,
        risk_free_rate,
        &MetricsOptions::default(),
    )
}

/// Compute the full metrics snapshot.
///
/// Validates the weights, aligns the weighted assets and the benchmark on their
/// common dates, composes the portfolio series, then derives every statistic
/// from the aligned series. Any failure is returned as-is; no statistic is
/// replaced with a placeholder.
pub fn compute_metrics_with(
    prices: &PriceMap,
    weights: &WeightMap,
    benchmark_id: &str,
    risk_free_rate: f64,
    options: &MetricsOptions,
) -> Result<MetricsResult> {
    if !risk_free_rate.is_finite() {
        return Err(Error::InvalidInput(format!(
            "risk-free rate must be finite, got {}",
            risk_free_rate
        )));
    }
    if options.periods_per_year == 0 {
        return Err(Error::InvalidInput(
            "periods per year must be positive".to_string(),
        ));
    }

    weights.validate(options.weight_tolerance)?;

    let benchmark_id = normalize_asset(benchmark_id);
    let assets = align::requested_assets(weights.assets(), &benchmark_id);
    let aligned = align_returns(prices, &assets)?;

    let portfolio = compose_portfolio(&aligned, weights)?;
    let benchmark = aligned.series(&benchmark_id)?;

    let result = MetricsResult {
        annualized_return: geometric_annualized_return(&portfolio, options.periods_per_year)?,
        cumulative_return: cumulative_return(&portfolio),
        sharpe_ratio: sharpe_ratio(&portfolio, risk_free_rate)?,
        sortino_ratio: sortino_ratio(&portfolio, risk_free_rate)?,
        max_drawdown: max_drawdown(&portfolio)?,
        beta_to_benchmark: beta(&portfolio, &benchmark)?,
        benchmark_cumulative_return: cumulative_return(&benchmark),
    };

    tracing::info!(
        assets = weights.len(),
        benchmark = %benchmark_id,
        periods = portfolio.len(),
        "Computed portfolio metrics"
    );

    Ok(result)
}
