//! Core data types for the metrics pipeline.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price series keyed by asset identifier.
pub type PriceMap = BTreeMap<String, PriceSeries>;

/// Normalize an asset identifier (trimmed, uppercase).
pub fn normalize_asset(id: &str) -> String {
    id.trim().to_uppercase()
}

/// A single dated price observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Price on that date (non-finite values are treated as gaps)
    pub price: f64,
}

/// Ordered price observations for one asset.
///
/// Dates are strictly increasing. Deserializing sorts the input and rejects
/// duplicate dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series from observations already in strictly increasing date order.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(Error::InvalidInput(format!(
                "price dates must be strictly increasing ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { points })
    }

    /// Create a series from observations in any order.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(Error::InvalidInput(format!(
                "duplicate price date {}",
                pair[0].date
            )));
        }
        Ok(Self { points })
    }

    /// Create a series from `(date, price)` pairs in strictly increasing date order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, price)| PricePoint { date, price })
                .collect(),
        )
    }

    /// All observations.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Restrict to `start <= date < end`. Either bound may be open.
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s))
            .filter(|p| end.map_or(true, |e| p.date < e))
            .copied()
            .collect();
        Self { points }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = Error;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::from_unsorted(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// Period-over-period fractional returns on a strictly increasing date index.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Create a return series from parallel date and value vectors.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "{} dates but {} return values",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidInput(
                "return dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { dates, values })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(date, return)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

impl AsRef<[f64]> for ReturnSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Fractional weight per asset.
///
/// Asset identifiers are normalized (trimmed, uppercase) on insert. Weights are
/// stored as given; see [`WeightMap::validate`] for the summation check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WeightMap {
    weights: BTreeMap<String, f64>,
}

impl WeightMap {
    /// Create an empty weight map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(asset, fractional weight)` pairs.
    pub fn from_pairs<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut map = Self::new();
        for (asset, weight) in pairs {
            map.insert(asset.as_ref(), weight);
        }
        map
    }

    /// Build from `(asset, percent)` pairs, e.g. `("SPY", 60.0)` becomes 0.6.
    pub fn from_percentages<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self::from_pairs(pairs.into_iter().map(|(asset, pct)| (asset, pct / 100.0)))
    }

    /// Equal weight (1/n) for each distinct asset.
    pub fn equal<S: AsRef<str>>(assets: &[S]) -> Self {
        let mut map = Self::new();
        for asset in assets {
            map.insert(asset.as_ref(), 0.0);
        }
        let n = map.len();
        if n > 0 {
            for weight in map.weights.values_mut() {
                *weight = 1.0 / n as f64;
            }
        }
        map
    }

    /// Set the weight for an asset, replacing any previous value.
    pub fn insert(&mut self, asset: &str, weight: f64) -> Option<f64> {
        self.weights.insert(normalize_asset(asset), weight)
    }

    /// Weight for an asset (identifier is normalized before lookup).
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.weights.get(&normalize_asset(asset)).copied()
    }

    /// Asset identifiers in sorted order.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Check that the map is non-empty, every weight is finite, and the weights
    /// sum to 1 within `tolerance`.
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidWeights("weight map is empty".to_string()));
        }

        if let Some((asset, weight)) = self.iter().find(|(_, w)| !w.is_finite()) {
            return Err(Error::InvalidWeights(format!(
                "weight for {} is not finite ({})",
                asset, weight
            )));
        }

        let total = self.total();
        if (total - 1.0).abs() > tolerance {
            return Err(Error::InvalidWeights(format!(
                "weights sum to {:.6}, expected 1.0",
                total
            )));
        }

        Ok(())
    }
}

/// Portfolio statistics versus a benchmark.
///
/// All values are raw fractions or ratios; percentage formatting is left to
/// [`crate::report::MetricsReport`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricsResult {
    /// Geometric annualized return of the portfolio
    pub annualized_return: f64,
    /// Compounded return of the portfolio over the whole period
    pub cumulative_return: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: f64,
    /// Annualized Sortino ratio
    pub sortino_ratio: f64,
    /// Largest peak-to-trough decline (non-positive)
    pub max_drawdown: f64,
    /// Regression slope of portfolio returns on benchmark returns
    pub beta_to_benchmark: f64,
    /// Compounded return of the benchmark over the same period
    pub benchmark_cumulative_return: f64,
}

/// API response wrapper used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_series_rejects_unordered_dates() {
        let result = PriceSeries::from_pairs([(d(2), 100.0), (d(1), 101.0)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = PriceSeries::from_pairs([(d(1), 100.0), (d(1), 101.0)]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_price_series_from_unsorted() {
        let series = PriceSeries::from_unsorted(vec![
            PricePoint { date: d(3), price: 102.0 },
            PricePoint { date: d(1), price: 100.0 },
            PricePoint { date: d(2), price: 101.0 },
        ])
        .unwrap();

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(series.points()[1].price, 101.0);
    }

    #[test]
    fn test_price_series_deserialize_rejects_duplicates() {
        let json = r#"[
            {"date": "2024-01-02", "price": 10.0},
            {"date": "2024-01-02", "price": 11.0}
        ]"#;
        let result: std::result::Result<PriceSeries, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_series_window() {
        let series =
            PriceSeries::from_pairs([(d(1), 1.0), (d(2), 2.0), (d(3), 3.0), (d(4), 4.0)]).unwrap();

        let window = series.window(Some(d(2)), Some(d(4)));
        assert_eq!(window.len(), 2);
        assert_eq!(window.points()[0].date, d(2));
        assert_eq!(window.points()[1].date, d(3));

        assert_eq!(series.window(None, None).len(), 4);
    }

    #[test]
    fn test_return_series_length_mismatch() {
        let result = ReturnSeries::new(vec![d(1), d(2)], vec![0.01]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_weight_map_normalizes_assets() {
        let weights = WeightMap::from_pairs([(" spy ", 0.6), ("qqq", 0.4)]);
        assert_eq!(weights.get("SPY"), Some(0.6));
        assert_eq!(weights.get("qqq"), Some(0.4));
        assert_eq!(weights.assets().collect::<Vec<_>>(), vec!["QQQ", "SPY"]);
    }

    #[test]
    fn test_weight_map_from_percentages() {
        let weights = WeightMap::from_percentages([("AAPL", 60.0), ("MSFT", 40.0)]);
        assert!((weights.get("AAPL").unwrap() - 0.6).abs() < 1e-12);
        assert!(weights.validate(1e-9).is_ok());
    }

    #[test]
    fn test_weight_map_equal() {
        let weights = WeightMap::equal(&["IEF", "LQD", "SHY", "GLD"]);
        assert_eq!(weights.len(), 4);
        assert!(weights.iter().all(|(_, w)| w == 0.25));
        assert!((weights.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_map_validate() {
        let empty = WeightMap::new();
        assert!(matches!(empty.validate(1e-6), Err(Error::InvalidWeights(_))));

        let short = WeightMap::from_pairs([("A", 0.5), ("B", 0.3)]);
        assert!(matches!(short.validate(1e-6), Err(Error::InvalidWeights(_))));

        let nan = WeightMap::from_pairs([("A", f64::NAN), ("B", 1.0)]);
        assert!(matches!(nan.validate(1e-6), Err(Error::InvalidWeights(_))));

        // Negative weights are allowed as long as the total is 1
        let levered = WeightMap::from_pairs([("A", 1.5), ("B", -0.5)]);
        assert!(levered.validate(1e-6).is_ok());
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
