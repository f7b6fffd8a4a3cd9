//! Scalar aliases shared across the replay engine.

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Integral share/contract quantity. Always non-negative.
pub type Quantity = u64;

/// Instrument identifier (equity ticker, currency pair).
pub type Ticker = String;

/// Period covered by one daily bar, in seconds.
pub const SECONDS_PER_DAY: u64 = 86_400;
