//! Trailing moving-average smoothing

use crate::analysis::statistics::mean;
use crate::error::{Error, Result};
use crate::types::TimeSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output of a rolling window.
///
/// Aligned one-to-one with the input series. Entries before the first full
/// window are `None` ("insufficient window") rather than dropped or NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedSeries {
    name: String,
    window: usize,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Option<f64>>,
}

impl SmoothedSeries {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smoothed value at `index`; `None` when undefined or out of range
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn is_defined(&self, index: usize) -> bool {
        self.value(index).is_some()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Iterate over `(timestamp, value)` including undefined entries
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, Option<f64>)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Only the defined entries, as a regular series
    pub fn defined(&self) -> TimeSeries {
        let (timestamps, values) = self.iter().filter_map(|(ts, v)| v.map(|v| (ts, v))).unzip();
        TimeSeries::from_sorted_unchecked(&self.name, timestamps, values)
    }
}

/// Trailing (causal) moving average over `window` observations.
///
/// `output[i] = mean(x[i-window+1..=i])` for `i >= window - 1`.
pub fn moving_average(series: &TimeSeries, window: usize) -> Result<SmoothedSeries> {
    let n = series.len();
    if window == 0 || window > n {
        return Err(Error::InvalidWindow { window, len: n });
    }

    let mut values = vec![None; window - 1];
    values.extend(series.values().windows(window).map(|w| Some(mean(w))));

    Ok(SmoothedSeries {
        name: series.name().to_string(),
        window,
        timestamps: series.timestamps().to_vec(),
        values,
    })
}
