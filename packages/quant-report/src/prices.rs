//! Local price file loading.
//!
//! Price files are JSON objects mapping asset identifiers to observation lists:
//!
//! ```json
//! {
//!   "SPY": [{"date": "2024-01-02", "price": 472.65}, {"date": "2024-01-03", "price": 468.79}],
//!   "QQQ": [{"date": "2024-01-02", "price": 402.52}, {"date": "2024-01-03", "price": 398.08}]
//! }
//! ```

use crate::types::{normalize_asset, PriceMap, PriceSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse a price map from JSON text. Asset identifiers are normalized.
pub fn parse_prices(content: &str) -> Result<PriceMap> {
    let raw: BTreeMap<String, PriceSeries> = serde_json::from_str(content)?;

    let mut prices = PriceMap::new();
    for (asset, series) in raw {
        let asset = normalize_asset(&asset);
        if prices.insert(asset.clone(), series).is_some() {
            return Err(Error::InvalidInput(format!(
                "asset {} appears more than once",
                asset
            )));
        }
    }
    Ok(prices)
}

/// Load a price map from a JSON file.
pub fn load_prices(path: &Path) -> Result<PriceMap> {
    let content = fs::read_to_string(path)?;
    let prices = parse_prices(&content)?;
    tracing::debug!(path = %path.display(), assets = prices.len(), "Loaded price file");
    Ok(prices)
}

/// Restrict every series to `start <= date < end`.
pub fn window_prices(
    prices: &PriceMap,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> PriceMap {
    prices
        .iter()
        .map(|(asset, series)| (asset.clone(), series.window(start, end)))
        .collect()
}
