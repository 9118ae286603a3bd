//! Report assembly and persistence.
//!
//! Turns a [`MetricsResult`] into labelled, formatted rows and writes them as a
//! two-column `Metric,Value` CSV file.

use crate::types::MetricsResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One labelled line of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRow {
    pub metric: String,
    pub value: String,
}

/// Formatted metrics ready for display or persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsReport {
    /// Benchmark the portfolio was measured against
    pub benchmark: String,
    /// Rows in presentation order
    pub rows: Vec<ReportRow>,
}

impl MetricsReport {
    /// Build the report rows for a result measured against `benchmark`.
    pub fn from_result(result: &MetricsResult, benchmark: &str) -> Self {
        let benchmark = benchmark.trim().to_uppercase();
        let rows = [
            ("Annualized Return".to_string(), format_percent(result.annualized_return)),
            ("Cumulative Return".to_string(), format_percent(result.cumulative_return)),
            ("Sharpe Ratio".to_string(), format_ratio(result.sharpe_ratio)),
            ("Sortino Ratio".to_string(), format_ratio(result.sortino_ratio)),
            ("Max Drawdown".to_string(), format_percent(result.max_drawdown)),
            (format!("Beta to {}", benchmark), format_ratio(result.beta_to_benchmark)),
            (
                format!("{} Cumulative", benchmark),
                format_percent(result.benchmark_cumulative_return),
            ),
        ]
        .into_iter()
        .map(|(metric, value)| ReportRow { metric, value })
        .collect();

        Self { benchmark, rows }
    }

    /// Look up a row's formatted value by label.
    pub fn value(&self, metric: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.metric == metric)
            .map(|row| row.value.as_str())
    }

    /// Render as CSV with a `Metric,Value` header.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Metric,Value\n");
        for row in &self.rows {
            out.push_str(&csv_field(&row.metric));
            out.push(',');
            out.push_str(&csv_field(&row.value));
            out.push('\n');
        }
        out
    }

    /// Write the CSV to `path`, creating parent directories as needed.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_csv())?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "Wrote metrics report");
        Ok(())
    }
}

/// Format a fraction as a percentage with two decimals (0.1234 -> "12.34%").
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a ratio with two decimals.
pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
