//! Run the full diagnostic pipeline on a price CSV
//!
//! Loads a daily price table, selects a typed column and reports
//! resampling, autocorrelation, ADF tests before and after differencing,
//! and moving-average smoothing.
//!
//! Usage:
//! ```
//! cargo run --bin analyze_series -- --file data/stock_data.csv --column high --acf-column volume
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use series_diagnostics::analysis::{AdfResult, LagSelection, Period, Reducer, Trend};
use series_diagnostics::config::DiagnosticsConfig;
use series_diagnostics::data::{
    load_price_bars, save_series, save_smoothed, split_by_symbol, PriceColumn,
};
use series_diagnostics::logging::setup_logging;
use series_diagnostics::pipeline::{diagnose_batch_with_acf, SeriesReport};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stationarity diagnostics for price series")]
struct Args {
    /// Input CSV file with a Date column and price columns
    #[arg(short, long)]
    file: PathBuf,

    /// Column to analyse
    #[arg(short, long, default_value = "high")]
    column: PriceColumn,

    /// Column for the autocorrelation report (defaults to --column)
    #[arg(long)]
    acf_column: Option<PriceColumn>,

    /// Only analyse this symbol when the file holds several
    #[arg(short, long)]
    symbol: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Resampling period (day, week, month, quarter, year)
    #[arg(long)]
    period: Option<Period>,

    /// Resampling reducer (mean, median, sum, min, max, count, first, last)
    #[arg(long)]
    reducer: Option<Reducer>,

    /// Difference order
    #[arg(long)]
    order: Option<usize>,

    /// Moving-average window
    #[arg(short, long)]
    window: Option<usize>,

    /// Maximum ACF lag
    #[arg(short, long)]
    max_lag: Option<usize>,

    /// ADF deterministic terms (n, c, ct)
    #[arg(long)]
    trend: Option<Trend>,

    /// ADF lag rule (aic, bic, t-stat, schwert) or a fixed lag count
    #[arg(long)]
    lags: Option<LagSelection>,

    /// Print the reports as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Directory for resampled, differenced and smoothed series CSVs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn effective_config(&self) -> Result<DiagnosticsConfig> {
        let mut config = match &self.config {
            Some(path) => DiagnosticsConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DiagnosticsConfig::default(),
        };

        if let Some(period) = self.period {
            config.resample.period = period;
        }
        if let Some(reducer) = self.reducer {
            config.resample.reducer = reducer;
        }
        if let Some(order) = self.order {
            config.difference.order = order;
        }
        if let Some(window) = self.window {
            config.smoothing.window = window;
        }
        if let Some(max_lag) = self.max_lag {
            config.autocorrelation.max_lag = max_lag;
        }
        if let Some(trend) = self.trend {
            config.stationarity.trend = trend;
        }
        if let Some(lags) = self.lags {
            config.stationarity.lag_selection = lags;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Tabled)]
struct AdfRow {
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "ADF Statistic")]
    statistic: String,
    #[tabled(rename = "P-Value")]
    p_value: String,
    #[tabled(rename = "Lags")]
    lags: usize,
    #[tabled(rename = "Obs")]
    nobs: usize,
    #[tabled(rename = "1%")]
    cv1: String,
    #[tabled(rename = "5%")]
    cv5: String,
    #[tabled(rename = "10%")]
    cv10: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl AdfRow {
    fn new(series: &str, adf: &AdfResult) -> Self {
        let stationary = adf.rejects_unit_root("5%").unwrap_or(false);
        Self {
            series: series.to_string(),
            statistic: format!("{:.4}", adf.statistic),
            p_value: format!("{:.4}", adf.p_value),
            lags: adf.used_lag,
            nobs: adf.nobs,
            cv1: format!("{:.3}", adf.critical_values.one_percent),
            cv5: format!("{:.3}", adf.critical_values.five_percent),
            cv10: format!("{:.3}", adf.critical_values.ten_percent),
            result: if stationary {
                "Stationary".green().to_string()
            } else {
                "Unit root".red().to_string()
            },
        }
    }
}

#[derive(Tabled)]
struct AcfRow {
    #[tabled(rename = "Lag")]
    lag: usize,
    #[tabled(rename = "ACF")]
    value: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "")]
    flag: String,
}

fn print_report(report: &SeriesReport, config: &DiagnosticsConfig) {
    println!("{}", "=".repeat(60).blue());
    println!("{} {}", "Diagnostics:".bold().blue(), report.name.bold());
    println!("{}", "=".repeat(60).blue());

    let s = &report.summary;
    println!(
        "  Observations: {}  mean: {:.4}  std: {:.4}  min: {:.4}  max: {:.4}",
        s.count, s.mean, s.std, s.min, s.max
    );

    println!(
        "\n{} ({} {})",
        "Resampling".bold(),
        config.resample.period,
        config.resample.reducer
    );
    println!("{}", "-".repeat(40));
    println!("  {} periods", report.resampled.len());
    for (ts, value) in report.resampled.iter().take(5) {
        println!("  {}  {:.4}", ts.format("%Y-%m-%d"), value);
    }
    if report.resampled.len() > 5 {
        println!("  ...");
    }

    println!("\n{}", "Stationarity Tests".bold());
    println!("{}", "-".repeat(40));
    let rows = vec![
        AdfRow::new("Levels", &report.adf_levels),
        AdfRow::new(
            &format!("Diff (order {})", config.difference.order),
            &report.adf_differenced,
        ),
    ];
    println!("{}", Table::new(rows));

    if report.differencing_helps(0.05) {
        println!("  {} Differencing removes the unit root.", "→".yellow());
    } else if report.adf_levels.is_stationary(0.05) {
        println!("  {} The series appears to be stationary.", "✓".green());
    } else {
        println!("  {} Still non-stationary after differencing.", "✗".red());
    }

    let smoothed = &report.smoothed;
    let defined = smoothed.defined();
    println!("\n{}", "Moving Average".bold());
    println!("{}", "-".repeat(40));
    println!(
        "  Window: {}  defined: {}  undefined: {}",
        smoothed.window(),
        defined.len(),
        smoothed.len() - defined.len()
    );
    if let Some((ts, v)) = defined.last() {
        println!("  Last: {}  {:.4}", ts.format("%Y-%m-%d"), v);
    }
}

fn print_acf(name: &str, values: &[f64], bands: &[f64]) {
    println!("\n{} {}", "Autocorrelation".bold(), name);
    println!("{}", "-".repeat(40));
    let rows: Vec<AcfRow> = values
        .iter()
        .zip(bands)
        .enumerate()
        .map(|(lag, (r, band))| AcfRow {
            lag,
            value: format!("{:>7.4}", r),
            band: format!("±{:.4}", band),
            flag: if lag > 0 && r.abs() > *band {
                "*".yellow().to_string()
            } else {
                String::new()
            },
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn write_outputs(dir: &Path, report: &SeriesReport) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let stem = report.name.replace(['/', '\\', ' '], "_");
    let path = |suffix: &str| dir.join(format!("{}_{}.csv", stem, suffix));

    save_series(&path("resampled"), &report.resampled)?;
    save_series(&path("diff"), &report.differenced)?;
    save_smoothed(&path("smoothed"), &report.smoothed)?;
    info!("Wrote {} outputs to {}", report.name, dir.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.effective_config()?;
    setup_logging(&config.logging.level)?;

    if let Some(path) = &args.write_config {
        config
            .save(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("{} {}", "Wrote config:".green(), path.display());
        return Ok(());
    }

    let bars = load_price_bars(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    info!("Loaded {} rows from {}", bars.len(), args.file.display());

    let default_symbol = args
        .file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("series");
    let mut groups = split_by_symbol(bars, default_symbol);
    if let Some(symbol) = &args.symbol {
        groups.retain(|k, _| k == symbol);
        if groups.is_empty() {
            anyhow::bail!("Symbol {} not found in {}", symbol, args.file.display());
        }
    }

    let acf_column = args.acf_column.filter(|c| *c != args.column);
    let mut inputs = Vec::with_capacity(groups.len());
    for (symbol, bars) in &groups {
        let name = if groups.len() > 1 {
            format!("{}:{}", symbol, args.column)
        } else {
            args.column.to_string()
        };
        let series = args.column.series(bars)?.with_name(&name);
        let companion = acf_column.map(|c| c.series(bars)).transpose()?;
        inputs.push((series, companion));
    }

    let results = diagnose_batch_with_acf(&inputs, &config);

    let mut reports = Vec::new();
    for (name, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) if e.is_input_error() => warn!("Skipping {}: {}", name, e),
            Err(e) => return Err(e.into()),
        }
    }
    if reports.is_empty() {
        anyhow::bail!("No series could be analysed");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report, &config);
            print_acf(
                &report.acf_series,
                report.acf.correlations(),
                &report.acf_bands,
            );

            let lb = &report.ljung_box;
            println!(
                "\nLjung-Box test on {} (lags={}): Q={:.2}, p-value={:.4}",
                report.acf_series, lb.lags, lb.statistic, lb.p_value
            );
            if lb.is_significant(config.autocorrelation.alpha) {
                println!("  {} Significant autocorrelation detected", "→".yellow());
            } else {
                println!("  {} No significant autocorrelation", "✓".green());
            }
        }
    }

    if let Some(dir) = &args.output_dir {
        for report in &reports {
            write_outputs(dir, report)?;
        }
    }

    println!("\n{}", "Done!".green().bold());
    Ok(())
}
