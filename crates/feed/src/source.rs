//! Price sources: the capability interface and the historical CSV variant.
//!
//! A price source owns its instrument series and the merged stream; the
//! rest of the system only ever sees events on the queue and snapshot
//! reads, so a historical replay is indistinguishable from a live feed.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, warn};

use tape_core::{
    BarEvent, DataConfig, Error, Event, EventQueue, FixedPrice, Result, Ticker, TimestampMs,
    SECONDS_PER_DAY,
};

use crate::loader::{self, DateWindow};
use crate::merge::{MergedRow, SeriesMerge};

/// Last-known prices for one subscribed instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSnapshot {
    /// Close of the most recent bar.
    pub close: FixedPrice,
    /// Adjusted close of the most recent bar.
    pub adj_close: FixedPrice,
    /// Timestamp of the most recent bar.
    pub timestamp: TimestampMs,
}

/// Capability interface every price source implements.
///
/// Callers program against this trait only; historical-CSV and
/// live-streaming variants differ solely in where their rows come from.
pub trait PriceSource {
    /// Register an instrument. Recoverable failures: `AlreadySubscribed`
    /// (the call is a no-op) and `SourceNotFound` (the instrument simply
    /// never appears in the stream).
    fn subscribe(&mut self, ticker: &str) -> Result<()>;

    /// Pull the next market event onto `queue`.
    ///
    /// Returns `false` exactly when the stream is exhausted, in which case
    /// nothing is enqueued and the continue flag drops permanently. The
    /// only two outcomes once streaming has begun: event produced, or
    /// exhausted.
    fn stream_next(&mut self, queue: &mut EventQueue) -> bool;

    /// Whether more historical events remain to stream.
    fn continue_backtest(&self) -> bool;

    /// Last-known prices for `ticker`; fails with `UnknownInstrument` if no
    /// price has ever been seen for it.
    fn latest_price(&self, ticker: &str) -> Result<PriceSnapshot>;
}

/// Streams daily bars from per-instrument CSV files in chronological order.
///
/// Subscribing loads and parses the instrument's full series eagerly,
/// primes the last-known snapshot from the first row, and registers the
/// series with the merge engine. `stream_next` then drains the merged
/// stream one bar at a time.
pub struct HistoricCsvPriceSource {
    csv_dir: PathBuf,
    window: DateWindow,
    /// Last-known snapshot per subscribed ticker; `None` until the
    /// instrument's first row is known (empty series stay `None`).
    tickers: HashMap<Ticker, Option<PriceSnapshot>>,
    stream: SeriesMerge,
    continue_backtest: bool,
    calc_adj_returns: bool,
    adj_close_returns: Vec<f64>,
}

impl HistoricCsvPriceSource {
    /// Create a source reading `<TICKER>.csv` files from `csv_dir`.
    pub fn new(csv_dir: impl Into<PathBuf>) -> Self {
        Self {
            csv_dir: csv_dir.into(),
            window: DateWindow::unbounded(),
            tickers: HashMap::new(),
            stream: SeriesMerge::new(),
            continue_backtest: true,
            calc_adj_returns: false,
            adj_close_returns: Vec::new(),
        }
    }

    /// Restrict replay to an inclusive `YYYY-MM-DD` date window.
    pub fn with_window(mut self, start: Option<&str>, end: Option<&str>) -> Result<Self> {
        self.window = DateWindow::from_bounds(start, end)?;
        Ok(self)
    }

    /// Track per-bar adjusted-close returns.
    pub fn with_adj_returns(mut self) -> Self {
        self.calc_adj_returns = true;
        self
    }

    /// Build a source from configuration, subscribing its tickers.
    ///
    /// Instruments without a CSV are logged and skipped, matching the
    /// recoverable-subscription contract.
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        let mut source = Self::new(config.csv_dir.clone())
            .with_window(config.start_date.as_deref(), config.end_date.as_deref())?;
        if config.calc_adj_returns {
            source = source.with_adj_returns();
        }
        for ticker in &config.tickers {
            match source.subscribe(ticker) {
                Ok(()) | Err(Error::SourceNotFound(_)) | Err(Error::AlreadySubscribed(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(source)
    }

    /// Ordered log of adjusted-close percentage returns, one entry per
    /// streamed bar after each instrument's first.
    pub fn adj_close_returns(&self) -> &[f64] {
        &self.adj_close_returns
    }

    fn build_event(&self, merged: &MergedRow) -> BarEvent {
        let row = &merged.row;
        BarEvent {
            ticker: merged.ticker.clone(),
            time: row.time,
            period_secs: SECONDS_PER_DAY,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            adj_close: Some(row.adj_close),
        }
    }

    /// Update the last-known snapshot, recording the adjusted return
    /// against the prior bar's adjusted close first.
    fn store_event(&mut self, merged: &MergedRow) {
        let row = &merged.row;
        let snapshot = self.tickers.entry(merged.ticker.clone()).or_default();
        if self.calc_adj_returns {
            if let Some(prev) = snapshot.filter(|p| p.timestamp != row.time) {
                let ret = row.adj_close.raw() as f64 / prev.adj_close.raw() as f64 - 1.0;
                self.adj_close_returns.push(ret);
            }
        }
        *snapshot = Some(PriceSnapshot {
            close: row.close,
            adj_close: row.adj_close,
            timestamp: row.time,
        });
    }
}

impl PriceSource for HistoricCsvPriceSource {
    fn subscribe(&mut self, ticker: &str) -> Result<()> {
        if self.tickers.contains_key(ticker) {
            warn!(ticker, "already subscribed, ignoring");
            return Err(Error::AlreadySubscribed(ticker.to_string()));
        }
        let rows = match loader::load_ticker_csv(&self.csv_dir, ticker, &self.window) {
            Ok(rows) => rows,
            Err(e @ Error::SourceNotFound(_)) => {
                warn!(ticker, "no data CSV found for pricing");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        // Prime the last-known snapshot from the first row so price
        // queries work before the instrument's first bar streams.
        let primed = rows.first().map(|row| PriceSnapshot {
            close: row.close,
            adj_close: row.adj_close,
            timestamp: row.time,
        });
        info!(ticker, rows = rows.len(), "subscribed");
        self.tickers.insert(ticker.to_string(), primed);
        self.stream.add_series(ticker, rows);
        Ok(())
    }

    fn stream_next(&mut self, queue: &mut EventQueue) -> bool {
        let Some(merged) = self.stream.next() else {
            if self.continue_backtest {
                info!("historical stream exhausted");
            }
            self.continue_backtest = false;
            return false;
        };
        let event = self.build_event(&merged);
        self.store_event(&merged);
        queue.enqueue(Event::Bar(event));
        true
    }

    fn continue_backtest(&self) -> bool {
        self.continue_backtest
    }

    fn latest_price(&self, ticker: &str) -> Result<PriceSnapshot> {
        self.tickers
            .get(ticker)
            .copied()
            .flatten()
            .ok_or_else(|| Error::UnknownInstrument(ticker.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tape_core::EventType;

    const SPY_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2017-01-03,2,3,1,2.5,2.75,1000
2017-01-04,2.5,3.5,1.5,3.0,3.25,1050
2017-01-05,3.0,4.0,2.0,3.5,3.75,1050.5
2017-01-06,3.5,4.5,2.5,4.0,4.25,1200
2017-01-09,4.0,5.0,3.0,4.5,4.75,800
";

    const NIKKEI_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2017-01-04,5,6,4,5.5,5,2000
2017-01-05,4.5,5.5,3.5,5,4.5,500
2017-01-06,4,5,3,4.5,4,1000
2017-01-10,3.5,4.5,2.5,4,3.5,1250.50
2017-01-11,3,4,2,3.5,3,1500
";

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SPY.csv"), SPY_CSV).unwrap();
        std::fs::write(dir.path().join("N225.csv"), NIKKEI_CSV).unwrap();
        dir
    }

    fn subscribed_source(dir: &tempfile::TempDir) -> HistoricCsvPriceSource {
        let mut source = HistoricCsvPriceSource::new(dir.path());
        source.subscribe("SPY").unwrap();
        source.subscribe("N225").unwrap();
        source
    }

    fn drain_bars(source: &mut HistoricCsvPriceSource) -> Vec<BarEvent> {
        let mut queue = EventQueue::new();
        let mut bars = Vec::new();
        while source.stream_next(&mut queue) {
            match queue.try_dequeue().unwrap() {
                Event::Bar(bar) => bars.push(bar),
                other => panic!("unexpected event kind {:?}", other.kind()),
            }
        }
        bars
    }

    #[test]
    fn test_subscribe_primes_latest_price() {
        let dir = fixture_dir();
        let source = subscribed_source(&dir);

        let snapshot = source.latest_price("SPY").unwrap();
        assert_eq!(snapshot.close.display(1), 2.5);
        assert_eq!(snapshot.adj_close.display(2), 2.75);
        assert_eq!(snapshot.timestamp, loader::parse_timestamp("2017-01-03").unwrap());
    }

    #[test]
    fn test_subscribe_twice_is_rejected_not_fatal() {
        let dir = fixture_dir();
        let mut source = subscribed_source(&dir);

        let err = source.subscribe("SPY").unwrap_err();
        assert!(matches!(err, Error::AlreadySubscribed(_)));
        // the original subscription is untouched
        assert_eq!(drain_bars(&mut source).len(), 10);
    }

    #[test]
    fn test_unknown_instrument_price_query() {
        let dir = fixture_dir();
        let source = subscribed_source(&dir);
        assert!(matches!(
            source.latest_price("GOOG"),
            Err(Error::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_stream_is_chronological_with_ticker_tiebreak() {
        let dir = fixture_dir();
        let mut source = subscribed_source(&dir);

        let bars = drain_bars(&mut source);
        let order: Vec<&str> = bars.iter().map(|b| b.ticker.as_str()).collect();
        assert_eq!(
            order,
            // N225 sorts before SPY on the three shared dates
            vec!["SPY", "N225", "SPY", "N225", "SPY", "N225", "SPY", "SPY", "N225", "N225"]
        );
        assert!(bars.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(bars.iter().all(|b| b.period_secs == SECONDS_PER_DAY));
    }

    #[test]
    fn test_stream_updates_latest_price() {
        let dir = fixture_dir();
        let mut source = subscribed_source(&dir);
        let mut queue = EventQueue::new();

        // first two merged rows: SPY@01-03, N225@01-04
        assert!(source.stream_next(&mut queue));
        assert!(source.stream_next(&mut queue));

        assert_eq!(source.latest_price("SPY").unwrap().close.display(1), 2.5);
        assert_eq!(source.latest_price("N225").unwrap().close.display(1), 5.5);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_exhaustion_is_terminal_and_idempotent() {
        let dir = fixture_dir();
        let mut source = subscribed_source(&dir);
        let mut queue = EventQueue::new();

        while source.stream_next(&mut queue) {}
        assert!(!source.continue_backtest());
        assert!(!source.stream_next(&mut queue));
        assert!(!source.continue_backtest());
        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn test_date_window_bounds_the_stream() {
        let dir = fixture_dir();
        let mut source = HistoricCsvPriceSource::new(dir.path())
            .with_window(Some("2017-01-05"), Some("2017-01-09"))
            .unwrap();
        source.subscribe("SPY").unwrap();
        source.subscribe("N225").unwrap();

        let bars = drain_bars(&mut source);
        assert_eq!(bars.len(), 5);
        assert!(bars
            .iter()
            .all(|b| b.time >= loader::parse_timestamp("2017-01-05").unwrap()
                && b.time <= loader::parse_timestamp("2017-01-09").unwrap()));
    }

    #[test]
    fn test_subscribe_mid_stream_joins_pending_merge() {
        let dir = fixture_dir();
        let mut source = HistoricCsvPriceSource::new(dir.path());
        source.subscribe("SPY").unwrap();
        let mut queue = EventQueue::new();
        assert!(source.stream_next(&mut queue));

        source.subscribe("N225").unwrap();
        let mut bars = Vec::new();
        while source.stream_next(&mut queue) {}
        while let Some(Event::Bar(bar)) = queue.try_dequeue() {
            bars.push(bar);
        }
        // one SPY bar already emitted; all five N225 bars still arrive
        assert_eq!(bars.iter().filter(|b| b.ticker == "N225").count(), 5);
    }

    #[test]
    fn test_adj_returns_use_prior_bar_baseline() {
        let dir = fixture_dir();
        let mut source = HistoricCsvPriceSource::new(dir.path()).with_adj_returns();
        source.subscribe("SPY").unwrap();
        drain_bars(&mut source);

        let returns = source.adj_close_returns();
        // five bars, four consecutive-bar returns
        assert_eq!(returns.len(), 4);
        assert_relative_eq!(returns[0], 3.25 / 2.75 - 1.0, epsilon = 1e-9);
        assert_relative_eq!(returns[3], 4.75 / 4.25 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_config_skips_missing_sources() {
        let dir = fixture_dir();
        let config = DataConfig {
            csv_dir: dir.path().to_string_lossy().into_owned(),
            tickers: vec!["SPY".to_string(), "MISSING".to_string()],
            start_date: None,
            end_date: None,
            calc_adj_returns: false,
        };
        let mut source = HistoricCsvPriceSource::from_config(&config).unwrap();
        assert!(source.latest_price("MISSING").is_err());
        assert_eq!(drain_bars(&mut source).len(), 5);
    }
}
