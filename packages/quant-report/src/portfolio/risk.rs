//! Risk-adjusted return and benchmark sensitivity metrics.
//!
//! Provides Sharpe ratio, Sortino ratio, max drawdown, and beta. Standard
//! deviations are sample deviations (divide by n - 1). Zero-dispersion inputs are
//! reported as `DegenerateSeries` instead of producing NaN or infinity.

use super::performance::{growth_path, TRADING_DAYS_PER_YEAR};
use crate::types::ReturnSeries;
use crate::{Error, Result};

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, or `None` when the values have no dispersion
/// (fewer than 2 values, or all values identical).
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 || values.iter().all(|&v| v == values[0]) {
        return None;
    }

    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let std = variance.sqrt();

    (std > 0.0 && std.is_finite()).then_some(std)
}

/// Calculate the annualized Sharpe ratio.
///
/// # Arguments
///
/// * `returns` - Daily returns
/// * `risk_free_rate` - Annual risk-free rate
///
/// # Returns
///
/// `sqrt(252) * mean(excess) / std(excess)` where `excess = r - risk_free_rate / 252`.
///
/// # Errors
///
/// `DegenerateSeries` if the excess returns have zero standard deviation
/// (e.g. a constant return series).
pub fn sharpe_ratio(returns: impl AsRef<[f64]>, risk_free_rate: f64) -> Result<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR as f64;
    let excess: Vec<f64> = returns.as_ref().iter().map(|r| r - daily_rf).collect();

    let std = sample_std(&excess).ok_or_else(|| {
        Error::DegenerateSeries(format!(
            "excess returns have zero standard deviation over {} periods",
            excess.len()
        ))
    })?;

    Ok((TRADING_DAYS_PER_YEAR as f64).sqrt() * mean(&excess) / std)
}

/// Calculate the annualized Sortino ratio.
///
/// # Arguments
///
/// * `returns` - Daily returns
/// * `risk_free_rate` - Annual risk-free rate
///
/// # Returns
///
/// `sqrt(252) * (mean(r) - risk_free_rate / 252) / std(downside)`, where the
/// downside is the subset of strictly negative returns.
///
/// # Errors
///
/// `DegenerateSeries` if the downside subset has no dispersion (no negative
/// returns, a single negative return, or identical negative returns).
pub fn sortino_ratio(returns: impl AsRef<[f64]>, risk_free_rate: f64) -> Result<f64> {
    let returns = returns.as_ref();
    let downside: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).copied().collect();

    let downside_std = sample_std(&downside).ok_or_else(|| {
        Error::DegenerateSeries(format!(
            "downside deviation undefined ({} negative returns)",
            downside.len()
        ))
    })?;

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR as f64;
    Ok((TRADING_DAYS_PER_YEAR as f64).sqrt() * (mean(returns) - daily_rf) / downside_std)
}

/// Calculate maximum drawdown from a series of returns.
///
/// Compounds the returns, tracks the running peak of the compounded value, and
/// returns the most negative `(value - peak) / peak`. The result is never
/// positive; 0 means the compounded series never declined. An empty series has
/// no drawdown.
///
/// # Errors
///
/// `DegenerateSeries` if the running peak is not positive (the first period
/// lost everything), where the relative decline is undefined.
pub fn max_drawdown(returns: impl AsRef<[f64]>) -> Result<f64> {
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0;

    for (i, growth) in growth_path(returns.as_ref()).enumerate() {
        if growth > peak {
            peak = growth;
        }
        if peak <= 0.0 {
            return Err(Error::DegenerateSeries(format!(
                "compounded value peaked at {} by period {}",
                peak, i
            )));
        }
        let drawdown = (growth - peak) / peak;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
    }

    Ok(max_drawdown)
}

/// Calculate beta of a portfolio to a benchmark.
///
/// Both series are inner-joined on date, then the slope of the least-squares
/// regression of portfolio returns on benchmark returns is returned
/// (`cov(benchmark, portfolio) / var(benchmark)`).
///
/// # Errors
///
/// * `InsufficientOverlap` if fewer than 2 dates are shared
/// * `DegenerateSeries` if the benchmark has zero variance over the shared dates
pub fn beta(portfolio: &ReturnSeries, benchmark: &ReturnSeries) -> Result<f64> {
    let (port, bench) = join_on_dates(portfolio, benchmark);

    if port.len() < 2 {
        return Err(Error::InsufficientOverlap {
            overlap: port.len(),
        });
    }

    if sample_std(&bench).is_none() {
        return Err(Error::DegenerateSeries(
            "benchmark returns have zero variance".to_string(),
        ));
    }

    let port_mean = mean(&port);
    let bench_mean = mean(&bench);

    let (covariance, bench_variance) = port.iter().zip(&bench).fold(
        (0.0, 0.0),
        |(cov, var), (p, b)| {
            let db = b - bench_mean;
            (cov + db * (p - port_mean), var + db * db)
        },
    );

    Ok(covariance / bench_variance)
}

/// Values of both series on their common dates.
fn join_on_dates(left: &ReturnSeries, right: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
    let mut a = left.iter().peekable();
    let mut b = right.iter().peekable();
    let mut left_values = Vec::new();
    let mut right_values = Vec::new();

    while let (Some(&(da, va)), Some(&(db, vb))) = (a.peek(), b.peek()) {
        match da.cmp(&db) {
            std::cmp::Ordering::Less => {
                a.next();
            }
            std::cmp::Ordering::Greater => {
                b.next();
            }
            std::cmp::Ordering::Equal => {
                left_values.push(va);
                right_values.push(vb);
                a.next();
                b.next();
            }
        }
    }

    (left_values, right_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn dated(values: &[f64], offset: i64) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64 + offset))
            .collect();
        ReturnSeries::new(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_sample_std() {
        // mean 5, squared deviations sum 32, n - 1 = 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sample_std(&values).unwrap(), (32.0f64 / 7.0).sqrt());

        assert!(sample_std(&[1.0]).is_none());
        assert!(sample_std(&[0.3, 0.3, 0.3]).is_none());
    }

    #[test]
    fn test_sharpe_ratio() {
        let returns = [0.01, -0.005, 0.008, -0.003, 0.012];
        let sharpe = sharpe_ratio(&returns, 0.0).unwrap();

        let m = mean(&returns);
        let s = sample_std(&returns).unwrap();
        assert_relative_eq!(sharpe, 252f64.sqrt() * m / s, max_relative = 1e-12);
        assert!(sharpe > 0.0);
    }

    #[test]
    fn test_sharpe_ratio_risk_free_shifts_mean_only() {
        let returns = [0.01, -0.005, 0.008, -0.003, 0.012];
        let without = sharpe_ratio(&returns, 0.0).unwrap();
        let with = sharpe_ratio(&returns, 0.252).unwrap();

        // 0.252 / 252 = 0.001 per period
        let s = sample_std(&returns).unwrap();
        assert_relative_eq!(without - with, 252f64.sqrt() * 0.001 / s, max_relative = 1e-9);
    }

    #[test]
    fn test_sharpe_ratio_constant_series_is_degenerate() {
        let constant: Vec<f64> = (0..100).map(|_| 0.001).collect();
        let result = sharpe_ratio(&constant, 0.04);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_sharpe_ratio_single_period_is_degenerate() {
        let result = sharpe_ratio(&[0.01], 0.0);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_sortino_ratio() {
        let returns = [0.02, -0.01, 0.015, -0.03, 0.01];
        let sortino = sortino_ratio(&returns, 0.0).unwrap();

        let downside_std = sample_std(&[-0.01, -0.03]).unwrap();
        assert_relative_eq!(
            sortino,
            252f64.sqrt() * mean(&returns) / downside_std,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_sortino_ratio_no_downside_is_degenerate() {
        let all_positive: Vec<f64> = (0..100).map(|i| 0.001 * (i % 3) as f64).collect();
        let result = sortino_ratio(&all_positive, 0.04);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_sortino_ratio_single_loss_is_degenerate() {
        let result = sortino_ratio(&[0.01, -0.02, 0.03], 0.0);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_max_drawdown() {
        // Series that goes up, then down significantly
        let returns = [0.10, 0.05, -0.15, -0.10, 0.05];

        // Peak: 1.10 * 1.05 = 1.155, trough: 1.155 * 0.85 * 0.90
        let expected = 0.85 * 0.90 - 1.0;
        assert_relative_eq!(max_drawdown(&returns).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_max_drawdown_no_loss() {
        let returns = [0.01, 0.02, 0.03, 0.01, 0.02];
        assert_eq!(max_drawdown(&returns).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_peak_starts_at_first_period() {
        // A loss on the first period has no earlier peak to fall from
        assert_eq!(max_drawdown(&[-0.10]).unwrap(), 0.0);
        assert_relative_eq!(
            max_drawdown(&[-0.10, -0.10]).unwrap(),
            -0.10,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_max_drawdown_total_loss_after_peak() {
        assert_eq!(max_drawdown(&[0.10, -1.0, 0.5]).unwrap(), -1.0);
    }

    #[test]
    fn test_max_drawdown_wiped_out_first_period_is_degenerate() {
        assert!(matches!(
            max_drawdown(&[-1.0, 0.1]),
            Err(Error::DegenerateSeries(_))
        ));
        assert!(matches!(
            max_drawdown(&[-1.5]),
            Err(Error::DegenerateSeries(_))
        ));
    }

    #[test]
    fn test_max_drawdown_empty() {
        let empty: Vec<f64> = Vec::new();
        assert_eq!(max_drawdown(&empty).unwrap(), 0.0);
    }

    #[test]
    fn test_beta_self_regression() {
        let r = dated(&[0.01, -0.02, 0.015, 0.003, -0.007], 0);
        assert_relative_eq!(beta(&r, &r).unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_beta_scaled_portfolio() {
        let bench = dated(&[0.01, -0.02, 0.015, 0.003, -0.007], 0);
        let levered: Vec<f64> = bench.values().iter().map(|r| 2.0 * r + 0.0001).collect();
        let port = dated(&levered, 0);

        assert_relative_eq!(beta(&port, &bench).unwrap(), 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_beta_aligns_on_dates() {
        // Portfolio shifted by one day overlaps on 3 of 4 dates
        let bench = dated(&[0.01, 0.02, -0.01, 0.03], 0);
        let port = dated(&[0.04, -0.02, 0.06, 9.99], 1);

        // Overlap: bench[1..4] = [0.02, -0.01, 0.03], port[0..3] = [0.04, -0.02, 0.06]
        assert_relative_eq!(beta(&port, &bench).unwrap(), 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_beta_zero_variance_benchmark() {
        let port = dated(&[0.01, -0.02, 0.03], 0);
        let bench = dated(&[0.0, 0.0, 0.0], 0);

        let result = beta(&port, &bench);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_beta_insufficient_overlap() {
        let port = dated(&[0.01, 0.02], 0);
        let bench = dated(&[0.03, 0.04], 1);

        let result = beta(&port, &bench);
        assert!(matches!(result, Err(Error::InsufficientOverlap { overlap: 1 })));
    }
}
