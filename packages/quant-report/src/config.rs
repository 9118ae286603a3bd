//! Run settings loaded from TOML.

use crate::portfolio::{MetricsOptions, TRADING_DAYS_PER_YEAR};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for a metrics run.
///
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Annual risk-free rate (e.g., 0.03 for 3%)
    pub risk_free_rate: f64,
    /// Periods per year used for annualization
    pub periods_per_year: usize,
    /// Benchmark asset identifier
    pub benchmark: String,
    /// Where the CSV report is written
    pub report_path: PathBuf,
    /// Allowed deviation of the weight total from 1.0
    pub weight_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
            benchmark: "SPY".to_string(),
            report_path: PathBuf::from("reports/ROOT_Report_Data.csv"),
            weight_tolerance: 1e-6,
        }
    }
}

impl Settings {
    /// Get the default config file path.
    ///
    /// Default path: `~/.config/quant-report/config.toml`
    /// Can be overridden with `QUANT_REPORT_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("QUANT_REPORT_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".config/quant-report/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::Config(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        if self.periods_per_year == 0 {
            return Err(Error::Config(
                "periods_per_year must be positive".to_string(),
            ));
        }
        if !self.weight_tolerance.is_finite() || self.weight_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "weight_tolerance must be a non-negative number, got {}",
                self.weight_tolerance
            )));
        }
        if self.benchmark.trim().is_empty() {
            return Err(Error::Config("benchmark must not be empty".to_string()));
        }
        Ok(())
    }

    /// Options passed to the metrics pipeline.
    pub fn metrics_options(&self) -> MetricsOptions {
        MetricsOptions {
            periods_per_year: self.periods_per_year,
            weight_tolerance: self.weight_tolerance,
        }
    }
}
