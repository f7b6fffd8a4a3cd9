//! CSV series loading and parsing.
//!
//! Reads one `<TICKER>.csv` of daily Yahoo-style OHLCV rows per instrument
//! and parses it eagerly into fixed-point rows, so malformed prices and
//! timestamps surface at subscribe time, before any event is emitted.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use tape_core::{Error, FixedPrice, Quantity, Result, TimestampMs};

/// One parsed historical row for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRow {
    /// Row timestamp (period start), epoch milliseconds UTC.
    pub time: TimestampMs,
    /// Open price.
    pub open: FixedPrice,
    /// High price.
    pub high: FixedPrice,
    /// Low price.
    pub low: FixedPrice,
    /// Close price.
    pub close: FixedPrice,
    /// Dividend/split-adjusted close.
    pub adj_close: FixedPrice,
    /// Total volume, truncated to an integer.
    pub volume: Quantity,
}

/// Inclusive replay window applied when a series is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindow {
    /// Earliest admitted timestamp, if bounded.
    pub start: Option<TimestampMs>,
    /// Latest admitted timestamp, if bounded.
    pub end: Option<TimestampMs>,
}

impl DateWindow {
    /// Window admitting every row.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parse `YYYY-MM-DD` bounds from configuration strings.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: start.map(parse_timestamp).transpose()?,
            end: end.map(parse_timestamp).transpose()?,
        })
    }

    /// Whether the window admits `time`.
    pub fn contains(&self, time: TimestampMs) -> bool {
        self.start.map_or(true, |s| time >= s) && self.end.map_or(true, |e| time <= e)
    }
}

/// Raw CSV record, Yahoo Finance daily column layout.
#[derive(Debug, Deserialize)]
struct CsvBarRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Adj Close")]
    adj_close: String,
    #[serde(rename = "Volume")]
    volume: String,
}

/// Parse a `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` timestamp to epoch ms UTC.
pub fn parse_timestamp(s: &str) -> Result<TimestampMs> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| Error::InvalidTimestamp(s.to_string()))
}

fn parse_volume(s: &str) -> Result<Quantity> {
    // Some vendors export volume with a decimal part; truncate it.
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| Error::data(format!("invalid volume field: {s:?}")))?;
    Ok(value as Quantity)
}

fn parse_row(record: &CsvBarRecord) -> Result<PriceRow> {
    Ok(PriceRow {
        time: parse_timestamp(&record.date)?,
        open: FixedPrice::parse_str(&record.open)?,
        high: FixedPrice::parse_str(&record.high)?,
        low: FixedPrice::parse_str(&record.low)?,
        close: FixedPrice::parse_str(&record.close)?,
        adj_close: FixedPrice::parse_str(&record.adj_close)?,
        volume: parse_volume(&record.volume)?,
    })
}

fn read_rows<R: Read>(reader: R, window: &DateWindow) -> Result<Vec<PriceRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let record: CsvBarRecord =
            result.map_err(|e| Error::data(format!("CSV parse error: {e}")))?;
        let row = parse_row(&record)?;
        if window.contains(row.time) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Load one instrument's series from `<csv_dir>/<ticker>.csv`.
///
/// Fails with `SourceNotFound` when the file does not exist and with
/// `InvalidPriceFormat`/`InvalidTimestamp` on the first malformed row.
pub fn load_ticker_csv(csv_dir: &Path, ticker: &str, window: &DateWindow) -> Result<Vec<PriceRow>> {
    let path = csv_dir.join(format!("{ticker}.csv"));
    if !path.exists() {
        return Err(Error::SourceNotFound(ticker.to_string()));
    }
    let file = std::fs::File::open(&path)?;
    let rows = read_rows(file, window)?;
    debug!(ticker, rows = rows.len(), "loaded price series");
    Ok(rows)
}
