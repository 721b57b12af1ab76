//! CSV storage for price tables and derived series

use crate::analysis::SmoothedSeries;
use crate::data::PriceBar;
use crate::error::{Error, Result};
use crate::types::TimeSeries;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{Reader, StringRecord, Writer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339 timestamps
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)));
    }
    Err(Error::ParseError(format!("unrecognised timestamp '{}'", raw)))
}

/// Header positions of the recognised columns
struct Layout {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    symbol: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Ok(Self {
            date: find(&["date", "timestamp", "datetime"])
                .ok_or_else(|| Error::ParseError("missing Date column".to_string()))?,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            close: find(&["close"]),
            volume: find(&["volume"]),
            symbol: find(&["name", "symbol", "ticker"]),
        })
    }
}

fn parse_field(record: &StringRecord, idx: Option<usize>, line: usize) -> Result<Option<f64>> {
    let Some(raw) = idx.and_then(|i| record.get(i)) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::ParseError(format!("line {}: invalid number '{}'", line, raw)))
}

/// Read price bars from any CSV source with a header row.
///
/// Unrecognised columns (such as an exported row index) are ignored.
pub fn read_price_bars<R: Read>(source: R) -> Result<Vec<PriceBar>> {
    let mut reader = Reader::from_reader(source);
    let layout = Layout::from_headers(reader.headers()?)?;
    let mut bars = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // header is line 1
        let line = i + 2;

        let raw_date = record
            .get(layout.date)
            .ok_or_else(|| Error::ParseError(format!("line {}: missing date", line)))?;

        bars.push(PriceBar {
            timestamp: parse_timestamp(raw_date)?,
            open: parse_field(&record, layout.open, line)?,
            high: parse_field(&record, layout.high, line)?,
            low: parse_field(&record, layout.low, line)?,
            close: parse_field(&record, layout.close, line)?,
            volume: parse_field(&record, layout.volume, line)?,
            symbol: layout
                .symbol
                .and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    Ok(bars)
}

/// Load price bars from a CSV file
pub fn load_price_bars(path: &Path) -> Result<Vec<PriceBar>> {
    let file = File::open(path)?;
    let bars = read_price_bars(file)?;
    tracing::debug!("Loaded {} bars from {}", bars.len(), path.display());
    Ok(bars)
}

/// Save a series to CSV
pub fn save_series(path: &Path, series: &TimeSeries) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["timestamp", series.name()])?;
    for (ts, value) in series.iter() {
        writer.write_record([ts.to_rfc3339(), value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Save a smoothed series to CSV; undefined entries are written as empty cells
pub fn save_smoothed(path: &Path, series: &SmoothedSeries) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let header = format!("{}_ma{}", series.name(), series.window());
    writer.write_record(["timestamp", header.as_str()])?;
    for (ts, value) in series.iter() {
        let cell = value.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([ts.to_rfc3339(), cell])?;
    }

    writer.flush()?;
    Ok(())
}

/// Load a two-column `timestamp,value` CSV written by [`save_series`]
pub fn load_series(path: &Path, name: &str) -> Result<TimeSeries> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(file);

    let mut points = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            continue;
        }
        let raw = record[1].trim();
        let value = raw
            .parse::<f64>()
            .map_err(|_| Error::ParseError(format!("line {}: invalid number '{}'", i + 2, raw)))?;
        points.push((parse_timestamp(&record[0])?, value));
    }

    TimeSeries::new(name, points)
}
