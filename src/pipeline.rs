//! Diagnostics pipeline
//!
//! Runs every analysis on one series in the classic exploratory order:
//! resample, autocorrelation, ADF on levels, difference, ADF on the
//! differences, smooth. Each step is an independent call on an explicit
//! input; nothing is carried between series.
//!
//! The autocorrelation step may look at a companion series (trading volume
//! next to prices, say). The report records which series it used.

use crate::analysis::{
    acf, adf_test, difference, ljung_box, moving_average, resample, AcfResult, AdfResult,
    DescriptiveStats, LjungBoxResult, SmoothedSeries,
};
use crate::config::DiagnosticsConfig;
use crate::error::Result;
use crate::types::TimeSeries;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Every diagnostic computed for one series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub name: String,
    pub summary: DescriptiveStats,
    pub resampled: TimeSeries,
    /// Series the ACF, bands and Ljung-Box test were computed on
    pub acf_series: String,
    pub acf: AcfResult,
    /// Bartlett half-widths at the configured alpha, indexed by lag
    pub acf_bands: Vec<f64>,
    pub ljung_box: LjungBoxResult,
    pub adf_levels: AdfResult,
    pub differenced: TimeSeries,
    pub adf_differenced: AdfResult,
    pub smoothed: SmoothedSeries,
}

impl SeriesReport {
    /// Differencing was needed: levels keep the unit root, differences reject it
    pub fn differencing_helps(&self, alpha: f64) -> bool {
        !self.adf_levels.is_stationary(alpha) && self.adf_differenced.is_stationary(alpha)
    }
}

/// Run the full diagnostic sequence on `series`
pub fn diagnose(series: &TimeSeries, config: &DiagnosticsConfig) -> Result<SeriesReport> {
    diagnose_with_acf(series, None, config)
}

/// Run the diagnostic sequence, taking the autocorrelation step from
/// `acf_series` when given and from `series` otherwise
pub fn diagnose_with_acf(
    series: &TimeSeries,
    acf_series: Option<&TimeSeries>,
    config: &DiagnosticsConfig,
) -> Result<SeriesReport> {
    let n = series.len();
    debug!(series = series.name(), observations = n, "Running diagnostics");

    let resampled = resample(series, config.resample.period, config.resample.reducer)?;
    debug!(
        period = %config.resample.period,
        reducer = %config.resample.reducer,
        points = resampled.len(),
        "Resampled"
    );

    let acf_input = acf_series.unwrap_or(series);
    let acf_cfg = &config.autocorrelation;
    let acf_limit = acf_input.len().saturating_sub(1);
    let max_lag = acf_cfg.max_lag.min(acf_limit);
    let acf_result = acf(acf_input, max_lag)?;
    let acf_bands = acf_result.confidence_bands(acf_cfg.alpha)?;
    let lb_lags = acf_cfg.ljung_box_lags.unwrap_or(max_lag).min(acf_limit);
    let lb = ljung_box(acf_input, lb_lags)?;
    debug!(
        series = acf_input.name(),
        max_lag,
        q = lb.statistic,
        p = lb.p_value,
        "Autocorrelation"
    );

    let adf_levels = adf_test(series, &config.stationarity)?;
    debug!(
        statistic = adf_levels.statistic,
        p = adf_levels.p_value,
        lag = adf_levels.used_lag,
        "ADF on levels"
    );

    let differenced = difference(series, config.difference.order)?;
    let adf_differenced = adf_test(&differenced, &config.stationarity)?;
    debug!(
        order = config.difference.order,
        statistic = adf_differenced.statistic,
        p = adf_differenced.p_value,
        "ADF on differences"
    );

    let smoothed = moving_average(series, config.smoothing.window)?;

    info!(
        series = series.name(),
        adf_levels = adf_levels.statistic,
        adf_differenced = adf_differenced.statistic,
        "Diagnostics complete"
    );

    Ok(SeriesReport {
        name: series.name().to_string(),
        summary: DescriptiveStats::new(series.values()),
        resampled,
        acf_series: acf_input.name().to_string(),
        acf: acf_result,
        acf_bands,
        ljung_box: lb,
        adf_levels,
        differenced,
        adf_differenced,
        smoothed,
    })
}

/// Diagnose independent series in parallel.
///
/// Results keep the input order; one failing series does not affect the others.
pub fn diagnose_batch(
    series: &[TimeSeries],
    config: &DiagnosticsConfig,
) -> Vec<(String, Result<SeriesReport>)> {
    series
        .par_iter()
        .map(|s| (s.name().to_string(), diagnose(s, config)))
        .collect()
}

/// Parallel [`diagnose_with_acf`] over `(series, acf_series)` pairs.
///
/// Results keep the input order and are named after the analysed series.
pub fn diagnose_batch_with_acf(
    inputs: &[(TimeSeries, Option<TimeSeries>)],
    config: &DiagnosticsConfig,
) -> Vec<(String, Result<SeriesReport>)> {
    inputs
        .par_iter()
        .map(|(series, acf_series)| {
            let report = diagnose_with_acf(series, acf_series.as_ref(), config);
            (series.name().to_string(), report)
        })
        .collect()
}
