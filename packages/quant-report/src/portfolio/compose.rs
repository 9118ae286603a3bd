//! Weighted portfolio return composition.

use super::align::AlignedReturns;
use crate::types::{ReturnSeries, WeightMap};
use crate::{Error, Result};

/// Combine aligned per-asset returns into one portfolio return series.
///
/// For each date the portfolio return is the sum over weighted assets of
/// `asset_return * weight`. Weights are applied as given: they are not
/// normalized here, and a map that does not sum to 1 scales the series.
/// Callers that need the summation check should run [`WeightMap::validate`]
/// first (as [`super::compute_metrics`] does).
///
/// # Errors
///
/// * `MissingAsset` if a weighted asset has no column in `returns`
/// * `InvalidWeights` if a weight is not finite
pub fn compose_portfolio(returns: &AlignedReturns, weights: &WeightMap) -> Result<ReturnSeries> {
    let mut portfolio = vec![0.0; returns.len()];

    for (asset, weight) in weights.iter() {
        if !weight.is_finite() {
            return Err(Error::InvalidWeights(format!(
                "weight for {} is not finite ({})",
                asset, weight
            )));
        }

        let column = returns
            .column(asset)
            .ok_or_else(|| Error::MissingAsset(asset.to_string()))?;

        for (acc, r) in portfolio.iter_mut().zip(column) {
            *acc += r * weight;
        }
    }

    ReturnSeries::new(returns.dates().to_vec(), portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::align::align_returns;
    use crate::types::{PriceMap, PriceSeries};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    /// Prices whose returns are exactly `returns`, starting at 100.
    fn prices_for(returns: &[f64]) -> PriceSeries {
        let mut price = 100.0;
        let mut pairs = vec![(d(1), price)];
        for (i, r) in returns.iter().enumerate() {
            price *= 1.0 + r;
            pairs.push((d(i as u32 + 2), price));
        }
        PriceSeries::from_pairs(pairs).unwrap()
    }

    fn aligned(a: &[f64], b: &[f64]) -> AlignedReturns {
        let mut prices = PriceMap::new();
        prices.insert("A".to_string(), prices_for(a));
        prices.insert("B".to_string(), prices_for(b));
        align_returns(&prices, &["A", "B"]).unwrap()
    }

    #[test]
    fn test_equal_weight_composition() {
        let returns = aligned(&[0.02, 0.02], &[0.0, 0.0]);
        let weights = WeightMap::from_pairs([("A", 0.5), ("B", 0.5)]);

        let portfolio = compose_portfolio(&returns, &weights).unwrap();

        assert_eq!(portfolio.dates(), returns.dates());
        assert_eq!(portfolio.len(), 2);
        assert_abs_diff_eq!(portfolio.values()[0], 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(portfolio.values()[1], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_applied_without_normalization() {
        let returns = aligned(&[0.10], &[0.20]);
        let weights = WeightMap::from_pairs([("A", 1.0), ("B", 1.0)]);

        let portfolio = compose_portfolio(&returns, &weights).unwrap();
        assert_abs_diff_eq!(portfolio.values()[0], 0.30, epsilon = 1e-12);
    }

    #[test]
    fn test_only_weighted_assets_contribute() {
        let returns = aligned(&[0.10], &[-0.50]);
        let weights = WeightMap::from_pairs([("A", 1.0)]);

        let portfolio = compose_portfolio(&returns, &weights).unwrap();
        assert_abs_diff_eq!(portfolio.values()[0], 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_asset() {
        let returns = aligned(&[0.01], &[0.02]);
        let weights = WeightMap::from_pairs([("A", 0.5), ("ZZZ", 0.5)]);

        let result = compose_portfolio(&returns, &weights);
        assert!(matches!(result, Err(Error::MissingAsset(ref a)) if a == "ZZZ"));
    }

    #[test]
    fn test_non_finite_weight() {
        let returns = aligned(&[0.01], &[0.02]);
        let weights = WeightMap::from_pairs([("A", f64::INFINITY)]);

        let result = compose_portfolio(&returns, &weights);
        assert!(matches!(result, Err(Error::InvalidWeights(_))));
    }
}
