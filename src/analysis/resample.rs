//! Calendar resampling

use crate::analysis::statistics::{mean, median};
use crate::error::{Error, Result};
use crate::types::TimeSeries;
use chrono::{Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar period used as a resampling bucket.
///
/// Buckets are labelled by their last calendar day at 00:00 UTC, so a
/// monthly view of January 2024 is stamped 2024-01-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    /// Weeks run Monday to Sunday
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    /// Last day of the period containing `date`
    pub fn bucket_end(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Day => Some(date),
            Period::Week => {
                let to_sunday = 6 - date.weekday().num_days_from_monday();
                date.checked_add_days(Days::new(to_sunday as u64))
            }
            Period::Month => month_end(date.year(), date.month()),
            Period::Quarter => {
                let quarter_last_month = (date.month() - 1) / 3 * 3 + 3;
                month_end(date.year(), quarter_last_month)
            }
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        }
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Period::Day),
            "w" | "week" | "weekly" => Ok(Period::Week),
            "m" | "month" | "monthly" => Ok(Period::Month),
            "q" | "quarter" | "quarterly" => Ok(Period::Quarter),
            "y" | "a" | "year" | "yearly" | "annual" => Ok(Period::Year),
            other => Err(Error::ConfigError(format!("unknown period '{}'", other))),
        }
    }
}

/// Aggregate applied to the values of one bucket.
///
/// `First` and `Last` depend on the order of the values within a bucket.
/// Series order is fixed by construction, so they are still deterministic.
/// Every reducer except `Count` returns the value unchanged for a single-point bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    #[default]
    Mean,
    Median,
    Sum,
    Min,
    Max,
    Count,
    First,
    Last,
}

impl Reducer {
    /// Reduce a non-empty bucket
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Reducer::Mean => mean(values),
            Reducer::Median => median(values),
            Reducer::Sum => values.iter().sum(),
            Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Count => values.len() as f64,
            Reducer::First => values.first().copied().unwrap_or(f64::NAN),
            Reducer::Last => values.last().copied().unwrap_or(f64::NAN),
        }
    }

    pub fn is_order_dependent(&self) -> bool {
        matches!(self, Reducer::First | Reducer::Last)
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Sum => "sum",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Count => "count",
            Reducer::First => "first",
            Reducer::Last => "last",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Reducer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(Reducer::Mean),
            "median" => Ok(Reducer::Median),
            "sum" => Ok(Reducer::Sum),
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            "count" => Ok(Reducer::Count),
            "first" => Ok(Reducer::First),
            "last" => Ok(Reducer::Last),
            other => Err(Error::ConfigError(format!("unknown reducer '{}'", other))),
        }
    }
}

/// Aggregate `series` into calendar buckets.
///
/// One output point per non-empty bucket, ordered by bucket end. Buckets
/// without source observations are omitted rather than filled.
pub fn resample(series: &TimeSeries, period: Period, reducer: Reducer) -> Result<TimeSeries> {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    let mut current: Option<NaiveDate> = None;
    let mut bucket: Vec<f64> = Vec::new();

    for (ts, value) in series.iter() {
        let end = period.bucket_end(ts.date_naive()).ok_or_else(|| {
            Error::InvalidSeries(format!("timestamp {} out of calendar range", ts.to_rfc3339()))
        })?;

        if current != Some(end) {
            if let Some(label) = current {
                labels.push(label);
                values.push(reducer.apply(&bucket));
                bucket.clear();
            }
            current = Some(end);
        }
        bucket.push(value);
    }

    if let Some(label) = current {
        labels.push(label);
        values.push(reducer.apply(&bucket));
    }

    let timestamps = labels
        .into_iter()
        .map(|d| Utc.from_utc_datetime(&d.and_time(chrono::NaiveTime::MIN)))
        .collect();

    Ok(TimeSeries::from_sorted_unchecked(series.name(), timestamps, values))
}
