//! Quant Report CLI - Portfolio metrics snapshot from local price data.
//!
//! Prints JSON on stdout for tool integration and writes the CSV report.
//! Logs go to stderr (`RUST_LOG` controls verbosity).

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quant_report::{
    compute_metrics_with,
    prices::{load_prices, window_prices},
    profiles::{get_profile, list_profiles, resolve_profile, DEFAULT_PROFILE},
    ApiResponse, MetricsReport, Settings, WeightMap,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "quant-report")]
#[command(about = "Portfolio return and risk report versus a benchmark")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/quant-report/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics for a portfolio
    Run {
        /// JSON price file ({"ASSET": [{"date": "YYYY-MM-DD", "price": 1.0}, ...]})
        #[arg(short, long)]
        prices: PathBuf,
        /// Manual weights in percent, e.g. "QQQ=60,IEF=40" (total = 100)
        #[arg(short, long, conflicts_with = "profile")]
        weights: Option<String>,
        /// Risk profile for equal-weight auto mode (low/medium/high)
        #[arg(long)]
        profile: Option<String>,
        /// Benchmark asset
        #[arg(short, long)]
        benchmark: Option<String>,
        /// Annual risk-free rate (e.g. 0.03 for 3%)
        #[arg(short, long)]
        risk_free_rate: Option<f64>,
        /// First date included (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// First date excluded (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// CSV report path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Risk profile commands
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List available profiles
    List,
    /// Get profile details
    Get {
        /// Profile ID
        #[arg(short, long)]
        id: String,
    },
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let (output, code) = match run(cli) {
        Ok(data) => (to_json(&ApiResponse::ok(data)), ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("{:#}", e);
            (
                to_json(&ApiResponse::<()>::err(format!("{:#}", e))),
                ExitCode::FAILURE,
            )
        }
    };

    println!("{}", output);
    code
}

fn to_json<T: serde::Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}

fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path),
        None => Settings::load(),
    }
    .context("loading settings")?;

    match cli.command {
        Commands::Run {
            prices,
            weights,
            profile,
            benchmark,
            risk_free_rate,
            start,
            end,
            output,
        } => handle_run(
            settings,
            RunArgs {
                prices,
                weights,
                profile,
                benchmark,
                risk_free_rate,
                start,
                end,
                output,
            },
        ),
        Commands::Profile { action } => handle_profile(action),
    }
}

struct RunArgs {
    prices: PathBuf,
    weights: Option<String>,
    profile: Option<String>,
    benchmark: Option<String>,
    risk_free_rate: Option<f64>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: Option<PathBuf>,
}

fn handle_run(settings: Settings, args: RunArgs) -> anyhow::Result<serde_json::Value> {
    let benchmark = args.benchmark.unwrap_or_else(|| settings.benchmark.clone());
    let risk_free_rate = args.risk_free_rate.unwrap_or(settings.risk_free_rate);
    let report_path = args.output.unwrap_or_else(|| settings.report_path.clone());

    let (mode, weights) = match args.weights {
        Some(spec) => ("manual", parse_weights(&spec)?),
        None => {
            let profile = resolve_profile(args.profile.as_deref().unwrap_or(DEFAULT_PROFILE));
            tracing::info!(
                profile = %profile.id,
                assets = ?profile.assets,
                "Auto portfolio with equal weights"
            );
            ("auto", profile.equal_weights())
        }
    };

    let prices = load_prices(&args.prices)
        .with_context(|| format!("reading prices from {}", args.prices.display()))?;
    let prices = window_prices(&prices, args.start, args.end);

    let result = compute_metrics_with(
        &prices,
        &weights,
        &benchmark,
        risk_free_rate,
        &settings.metrics_options(),
    )?;

    let report = MetricsReport::from_result(&result, &benchmark);
    report
        .write_csv(&report_path)
        .with_context(|| format!("writing report to {}", report_path.display()))?;

    Ok(json!({
        "mode": mode,
        "weights": weights,
        "benchmark": report.benchmark,
        "risk_free_rate": risk_free_rate,
        "metrics": result,
        "report": report.rows,
        "report_path": report_path,
    }))
}

/// Parse "ASSET=PERCENT,..." into fractional weights.
fn parse_weights(spec: &str) -> anyhow::Result<WeightMap> {
    let mut pairs = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (asset, pct) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("weight entry '{}' must look like ASSET=PERCENT", entry))?;
        let pct: f64 = pct
            .trim()
            .parse()
            .with_context(|| format!("invalid weight for {}", asset.trim()))?;
        pairs.push((asset.trim().to_string(), pct));
    }
    Ok(WeightMap::from_percentages(pairs))
}

fn handle_profile(action: ProfileAction) -> anyhow::Result<serde_json::Value> {
    match action {
        ProfileAction::List => Ok(json!({ "profiles": list_profiles() })),
        ProfileAction::Get { id } => Ok(serde_json::to_value(get_profile(&id)?)?),
    }
}
