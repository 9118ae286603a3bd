//! Return compounding and annualization.

use crate::{Error, Result};

/// Trading periods per year used for annualization and ratio scaling.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Lazily compound a return series.
///
/// Element `i` is `(1 + r[0]) * ... * (1 + r[i]) - 1`.
pub fn cumulative_returns(returns: &[f64]) -> impl Iterator<Item = f64> + '_ {
    growth_path(returns).map(|growth| growth - 1.0)
}

/// Compounded value of one unit after each period.
pub(crate) fn growth_path(returns: &[f64]) -> impl Iterator<Item = f64> + '_ {
    returns.iter().scan(1.0, |growth, r| {
        *growth *= 1.0 + r;
        Some(*growth)
    })
}

/// Total compounded return of a series: `Π(1 + r) - 1`.
///
/// An empty series has a cumulative return of zero.
pub fn cumulative_return(returns: impl AsRef<[f64]>) -> f64 {
    cumulative_returns(returns.as_ref()).last().unwrap_or(0.0)
}

/// Geometric annualized return.
///
/// With `G = Π(1 + r)` over `n` periods the result is
/// `G^(periods_per_year / n) - 1`.
///
/// # Errors
///
/// * `InsufficientData` for an empty series
/// * `DegenerateSeries` if compounded growth is negative (a period lost more than
///   everything), which has no real fractional power
pub fn geometric_annualized_return(
    returns: impl AsRef<[f64]>,
    periods_per_year: usize,
) -> Result<f64> {
    let returns = returns.as_ref();
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "cannot annualize an empty return series".to_string(),
        ));
    }

    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    if growth < 0.0 {
        return Err(Error::DegenerateSeries(format!(
            "compounded growth is negative ({})",
            growth
        )));
    }

    let n = returns.len() as f64;
    Ok(growth.powf(periods_per_year as f64 / n) - 1.0)
}
