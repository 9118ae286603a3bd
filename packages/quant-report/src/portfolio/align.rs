//! Price alignment and return derivation.
//!
//! Restricts a set of price series to the dates every requested asset has a
//! usable observation for, then derives per-asset returns on that common index.

use crate::types::{normalize_asset, PriceMap, PriceSeries, ReturnSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Per-asset returns sharing one date index.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl AlignedReturns {
    /// The common date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of return periods.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Raw return values for one asset.
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.columns.get(&normalize_asset(asset)).map(Vec::as_slice)
    }

    /// Return series for one asset on the common index.
    pub fn series(&self, asset: &str) -> Result<ReturnSeries> {
        let values = self
            .column(asset)
            .ok_or_else(|| Error::MissingAsset(normalize_asset(asset)))?;
        ReturnSeries::new(self.dates.clone(), values.to_vec())
    }
}

/// Align the requested assets' prices on their common dates and derive returns.
///
/// Asset identifiers are matched after normalization, so `"spy"` in `prices`
/// satisfies a request for `"SPY"`. Observations with non-finite prices count as
/// missing. Only dates present for every requested asset are kept (inner join);
/// assets in `prices` that were not requested never shrink the index. Returns are the period-over-period
/// percentage change; the first aligned row and any row where some asset's return
/// is undefined are dropped.
///
/// # Errors
///
/// * `InvalidInput` if two keys of `prices` normalize to the same asset
/// * `MissingAsset` if a requested asset has no price series
/// * `InsufficientData` if fewer than 2 aligned price observations remain, or
///   no defined return survives
pub fn align_returns<S: AsRef<str>>(prices: &PriceMap, assets: &[S]) -> Result<AlignedReturns> {
    let requested: BTreeSet<String> = assets
        .iter()
        .map(|a| normalize_asset(a.as_ref()))
        .collect();
    if requested.is_empty() {
        return Err(Error::InsufficientData("no assets requested".to_string()));
    }

    let by_asset = normalized_view(prices)?;

    // Usable observations per requested asset
    let mut observations: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for asset in &requested {
        let asset = asset.as_str();
        let series = by_asset
            .get(asset)
            .ok_or_else(|| Error::MissingAsset(asset.to_string()))?;
        let usable: BTreeMap<NaiveDate, f64> = series
            .points()
            .iter()
            .filter(|p| p.price.is_finite())
            .map(|p| (p.date, p.price))
            .collect();
        if usable.len() < series.len() {
            tracing::debug!(
                asset,
                dropped = series.len() - usable.len(),
                "Dropped non-finite price observations"
            );
        }
        observations.insert(asset, usable);
    }

    // Inner join on date
    let mut common: Vec<NaiveDate> = match observations.values().next() {
        Some(first) => first.keys().copied().collect(),
        None => Vec::new(),
    };
    common.retain(|date| observations.values().all(|obs| obs.contains_key(date)));

    if common.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "{} aligned price observations across {:?}, need at least 2",
            common.len(),
            requested
        )));
    }

    let mut dates = Vec::with_capacity(common.len() - 1);
    let mut columns: BTreeMap<String, Vec<f64>> = requested
        .iter()
        .map(|a| (a.clone(), Vec::with_capacity(common.len() - 1)))
        .collect();
    let mut undefined_rows = 0usize;

    for pair in common.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let row: Vec<(&str, f64)> = observations
            .iter()
            .map(|(&asset, obs)| (asset, obs[&curr] / obs[&prev] - 1.0))
            .collect();

        if row.iter().any(|(_, r)| !r.is_finite()) {
            undefined_rows += 1;
            continue;
        }

        dates.push(curr);
        for (asset, r) in row {
            if let Some(column) = columns.get_mut(asset) {
                column.push(r);
            }
        }
    }

    if undefined_rows > 0 {
        tracing::debug!(undefined_rows, "Dropped rows with undefined returns");
    }

    if dates.is_empty() {
        return Err(Error::InsufficientData(
            "no defined returns after alignment".to_string(),
        ));
    }

    tracing::debug!(
        assets = requested.len(),
        periods = dates.len(),
        "Aligned price series"
    );

    Ok(AlignedReturns { dates, columns })
}

/// Price series keyed by normalized asset identifier.
fn normalized_view(prices: &PriceMap) -> Result<BTreeMap<String, &PriceSeries>> {
    let mut by_asset = BTreeMap::new();
    for (key, series) in prices {
        let asset = normalize_asset(key);
        if by_asset.insert(asset.clone(), series).is_some() {
            return Err(Error::InvalidInput(format!(
                "asset {} appears more than once in the price map",
                asset
            )));
        }
    }
    Ok(by_asset)
}

/// Assets to align for a run: the weighted assets plus the benchmark.
pub(crate) fn requested_assets<'a>(
    weighted: impl Iterator<Item = &'a str>,
    benchmark_id: &str,
) -> Vec<String> {
    let mut assets: BTreeSet<String> = weighted.map(str::to_string).collect();
    assets.insert(normalize_asset(benchmark_id));
    assets.into_iter().collect()
}
