//! # Price data
//!
//! Typed price bars and the CSV loader that feeds the analysis routines.

mod storage;

pub use storage::*;

use crate::error::{Error, Result};
use crate::types::TimeSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One row of a daily price table. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub symbol: Option<String>,
}

/// Column of a price table to analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceColumn {
    /// Field of `bar` this column refers to
    pub fn extract(&self, bar: &PriceBar) -> Option<f64> {
        match self {
            PriceColumn::Open => bar.open,
            PriceColumn::High => bar.high,
            PriceColumn::Low => bar.low,
            PriceColumn::Close => bar.close,
            PriceColumn::Volume => bar.volume,
        }
    }

    /// Build a series from this column, skipping rows where it is missing
    pub fn series(&self, bars: &[PriceBar]) -> Result<TimeSeries> {
        let points: Vec<_> = bars
            .iter()
            .filter_map(|bar| self.extract(bar).map(|v| (bar.timestamp, v)))
            .collect();

        let skipped = bars.len() - points.len();
        if skipped > 0 {
            tracing::warn!("Skipped {} rows with missing {}", skipped, self);
        }

        TimeSeries::new(&self.to_string(), points)
    }
}

impl fmt::Display for PriceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceColumn::Open => "open",
            PriceColumn::High => "high",
            PriceColumn::Low => "low",
            PriceColumn::Close => "close",
            PriceColumn::Volume => "volume",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PriceColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(PriceColumn::Open),
            "high" => Ok(PriceColumn::High),
            "low" => Ok(PriceColumn::Low),
            "close" => Ok(PriceColumn::Close),
            "volume" => Ok(PriceColumn::Volume),
            other => Err(Error::ConfigError(format!("unknown price column '{}'", other))),
        }
    }
}

/// Group bars by symbol, keeping row order within each group.
///
/// Bars without a symbol are grouped under `default_symbol`.
pub fn split_by_symbol(
    bars: Vec<PriceBar>,
    default_symbol: &str,
) -> BTreeMap<String, Vec<PriceBar>> {
    let mut groups: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
    for bar in bars {
        let key = bar.symbol.as_deref().unwrap_or(default_symbol).to_string();
        groups.entry(key).or_default().push(bar);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(day: i64, high: Option<f64>, symbol: Option<&str>) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            open: None,
            high,
            low: None,
            close: None,
            volume: Some(1000.0),
            symbol: symbol.map(str::to_string),
        }
    }

    #[test]
    fn test_series_skips_missing_rows() {
        let bars = vec![
            bar(0, Some(1.0), None),
            bar(1, None, None),
            bar(2, Some(3.0), None),
        ];
        let series = PriceColumn::High.series(&bars).unwrap();
        assert_eq!(series.values(), &[1.0, 3.0]);
        assert_eq!(series.name(), "high");
    }

    #[test]
    fn test_unsorted_rows_are_rejected() {
        let bars = vec![bar(2, Some(1.0), None), bar(1, Some(2.0), None)];
        assert!(matches!(
            PriceColumn::High.series(&bars),
            Err(Error::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_split_by_symbol() {
        let bars = vec![
            bar(0, Some(1.0), Some("AAPL")),
            bar(0, Some(2.0), Some("IBM")),
            bar(1, Some(3.0), Some("AAPL")),
            bar(1, Some(4.0), None),
        ];
        let groups = split_by_symbol(bars, "data");
        assert_eq!(groups.len(), 3);
        assert_eq!(groups["AAPL"].len(), 2);
        assert_eq!(groups["data"].len(), 1);
    }

    #[test]
    fn test_parse_column() {
        assert_eq!("High".parse::<PriceColumn>().unwrap(), PriceColumn::High);
        assert!("adj_close".parse::<PriceColumn>().is_err());
    }
}
