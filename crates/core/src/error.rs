//! Error types for the replay engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the replay engine.
///
/// Subscription errors (`SourceNotFound`, `AlreadySubscribed`) and price
/// queries for unknown instruments are recoverable: the caller is notified
/// and the run continues. Malformed input rows surface at load time, before
/// any event is emitted. Stream exhaustion is NOT an error anywhere in this
/// workspace; it is reported through the continue flag.
#[derive(Error, Debug)]
pub enum Error {
    /// No historical data exists for the instrument.
    #[error("No price source found for instrument {0}")]
    SourceNotFound(String),

    /// The instrument is already subscribed; the call was a no-op.
    #[error("Instrument {0} is already subscribed")]
    AlreadySubscribed(String),

    /// Price query for an instrument that was never subscribed.
    #[error("Unknown instrument {0}")]
    UnknownInstrument(String),

    /// A price field could not be parsed as a decimal number.
    #[error("Invalid price format: {0:?}")]
    InvalidPriceFormat(String),

    /// A timestamp field could not be parsed.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// Malformed input data (bad row shape, unreadable record).
    #[error("Data error: {0}")]
    Data(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Equality is structural for the string-carrying variants. The opaque
/// `Io` and `Json` variants wrap foreign error types that are not
/// `PartialEq`, so they are compared by their display representation.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        use Error::*;
        match (self, other) {
            (SourceNotFound(a), SourceNotFound(b)) => a == b,
            (AlreadySubscribed(a), AlreadySubscribed(b)) => a == b,
            (UnknownInstrument(a), UnknownInstrument(b)) => a == b,
            (InvalidPriceFormat(a), InvalidPriceFormat(b)) => a == b,
            (InvalidTimestamp(a), InvalidTimestamp(b)) => a == b,
            (Data(a), Data(b)) => a == b,
            (Config(a), Config(b)) => a == b,
            (Io(a), Io(b)) => a.to_string() == b.to_string(),
            (Json(a), Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl Error {
    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
