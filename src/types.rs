//! Core data types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;

/// Ordered timestamp → value series.
///
/// Timestamps are strictly increasing and every value is finite. The fields
/// are private so the invariant holds for the lifetime of the value; every
/// transformation in this crate returns a new series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    name: String,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from `(timestamp, value)` pairs
    pub fn new(name: &str, points: Vec<(DateTime<Utc>, f64)>) -> Result<Self> {
        let (timestamps, values) = points.into_iter().unzip();
        Self::from_parts(name, timestamps, values)
    }

    /// Build a series from parallel timestamp and value vectors
    pub fn from_parts(
        name: &str,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::InvalidSeries(format!(
                "{} timestamps for {} values",
                timestamps.len(),
                values.len()
            )));
        }

        for (i, w) in timestamps.windows(2).enumerate() {
            if w[1] == w[0] {
                return Err(Error::InvalidSeries(format!(
                    "duplicate timestamp {} at index {}",
                    w[1].to_rfc3339(),
                    i + 1
                )));
            }
            if w[1] < w[0] {
                return Err(Error::InvalidSeries(format!(
                    "timestamp {} at index {} precedes {}",
                    w[1].to_rfc3339(),
                    i + 1,
                    w[0].to_rfc3339()
                )));
            }
        }

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidSeries(format!(
                "non-finite value {} at index {}",
                values[i], i
            )));
        }

        Ok(Self {
            name: name.to_string(),
            timestamps,
            values,
        })
    }

    /// Series label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same data under a different label
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Timestamp at `index`
    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(index).copied()
    }

    /// Observation at `index`
    pub fn get(&self, index: usize) -> Option<(DateTime<Utc>, f64)> {
        Some((self.timestamp(index)?, self.value(index)?))
    }

    /// Copy of the observations in `range`
    pub fn slice(&self, range: Range<usize>) -> Result<TimeSeries> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::OutOfRange {
                start: range.start,
                end: range.end,
                len: self.len(),
            });
        }

        Ok(Self {
            name: self.name.clone(),
            timestamps: self.timestamps[range.clone()].to_vec(),
            values: self.values[range].to_vec(),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn first(&self) -> Option<(DateTime<Utc>, f64)> {
        self.get(0)
    }

    pub fn last(&self) -> Option<(DateTime<Utc>, f64)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over `(timestamp, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Build a series whose ordering was established by the caller.
    pub(crate) fn from_sorted_unchecked(
        name: &str,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        debug_assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
        Self {
            name: name.to_string(),
            timestamps,
            values,
        }
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
