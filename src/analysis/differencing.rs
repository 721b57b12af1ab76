//! Differencing and its inverse

use crate::error::{Error, Result};
use crate::types::TimeSeries;
use chrono::{DateTime, Utc};

/// First differences `x[i] - x[i-1]` of a plain slice
pub fn difference_values(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Difference `series` `order` times.
///
/// Each pass drops the leading observation and stamps every difference with
/// the later timestamp of its pair, so the result has `len - order` points.
/// Orders above one are repeated first differences.
pub fn difference(series: &TimeSeries, order: usize) -> Result<TimeSeries> {
    let n = series.len();
    if n < order + 1 {
        return Err(Error::InsufficientData {
            required: order + 1,
            actual: n,
        });
    }

    let mut values = series.values().to_vec();
    for _ in 0..order {
        values = difference_values(&values);
    }

    Ok(TimeSeries::from_sorted_unchecked(
        series.name(),
        series.timestamps()[order..].to_vec(),
        values,
    ))
}

/// Rebuild levels from an order-1 differenced series and its known first
/// observation.
pub fn cumulative_sum(
    initial: (DateTime<Utc>, f64),
    differenced: &TimeSeries,
) -> Result<TimeSeries> {
    let (start, first_value) = initial;
    if !first_value.is_finite() {
        return Err(Error::InvalidSeries(format!("non-finite initial value {}", first_value)));
    }
    if let Some(next) = differenced.timestamp(0) {
        if start >= next {
            return Err(Error::InvalidSeries(format!(
                "initial timestamp {} does not precede {}",
                start.to_rfc3339(),
                next.to_rfc3339()
            )));
        }
    }

    let mut timestamps = Vec::with_capacity(differenced.len() + 1);
    let mut values = Vec::with_capacity(differenced.len() + 1);
    timestamps.push(start);
    values.push(first_value);

    let mut level = first_value;
    for (ts, delta) in differenced.iter() {
        level += delta;
        timestamps.push(ts);
        values.push(level);
    }

    Ok(TimeSeries::from_sorted_unchecked(differenced.name(), timestamps, values))
}
