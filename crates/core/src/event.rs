//! The closed set of events flowing through the replay queue.
//!
//! Every component communicates exclusively through these variants: the
//! price source emits `Tick`/`Bar`, the strategy emits `Signal`, the
//! portfolio emits `Order`, the execution handler emits `Fill`. Events are
//! value objects; no field is mutated after construction.

use serde::{Deserialize, Serialize};

use crate::price::FixedPrice;
use crate::types::{Quantity, Ticker, TimestampMs};

/// Event discriminant, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Tick,
    Bar,
    Signal,
    Order,
    Fill,
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Order flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// An instantaneous best-bid/best-ask quote, from streaming sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvent {
    /// Instrument the quote belongs to.
    pub ticker: Ticker,
    /// Quote timestamp.
    pub time: TimestampMs,
    /// Best bid.
    pub bid: FixedPrice,
    /// Best ask.
    pub ask: FixedPrice,
}

impl TickEvent {
    /// Mid price, truncated to the sub-unit.
    #[inline]
    pub fn mid(&self) -> FixedPrice {
        FixedPrice((self.bid.raw() + self.ask.raw()) / 2)
    }
}

/// An OHLCV summary over a fixed period, from historical sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarEvent {
    /// Instrument the bar belongs to.
    pub ticker: Ticker,
    /// Bar timestamp (period start).
    pub time: TimestampMs,
    /// Period covered by the bar, in seconds (86 400 for daily data).
    pub period_secs: u64,
    /// Open price.
    pub open: FixedPrice,
    /// High price.
    pub high: FixedPrice,
    /// Low price.
    pub low: FixedPrice,
    /// Close price.
    pub close: FixedPrice,
    /// Total volume.
    pub volume: Quantity,
    /// Dividend/split-adjusted close, when the source provides one.
    pub adj_close: Option<FixedPrice>,
}

/// Strategy advice, acted upon by a portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Instrument to trade.
    pub ticker: Ticker,
    /// Direction of the advice.
    pub side: Side,
    /// Timestamp of the market event that produced the signal.
    pub time: TimestampMs,
    /// Sizing hint; the portfolio may override it.
    pub suggested_quantity: Option<Quantity>,
}

/// An order sent to an execution system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Instrument to trade.
    pub ticker: Ticker,
    /// Direction of the order.
    pub side: Side,
    /// Quantity to fill. Non-negative.
    pub quantity: Quantity,
    /// Market or limit.
    pub order_type: OrderType,
}

/// A filled order, as returned from a brokerage or simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Bar-resolution timestamp at which the order filled.
    pub time: TimestampMs,
    /// Instrument that was filled.
    pub ticker: Ticker,
    /// Exchange the fill came from.
    pub exchange: String,
    /// Filled quantity.
    pub quantity: Quantity,
    /// Direction of the fill.
    pub side: Side,
    /// Fill price per unit.
    pub fill_cost: FixedPrice,
    /// Commission charged for the fill.
    pub commission: FixedPrice,
}

impl FillEvent {
    /// Notional value of the fill, excluding commission.
    #[inline]
    pub fn notional(&self) -> FixedPrice {
        self.fill_cost * self.quantity as i64
    }
}

/// Tagged union over every event kind; consumers match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Tick(TickEvent),
    Bar(BarEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// The immutable discriminant.
    pub fn kind(&self) -> EventType {
        match self {
            Event::Tick(_) => EventType::Tick,
            Event::Bar(_) => EventType::Bar,
            Event::Signal(_) => EventType::Signal,
            Event::Order(_) => EventType::Order,
            Event::Fill(_) => EventType::Fill,
        }
    }

    /// Instrument the event refers to.
    pub fn ticker(&self) -> &str {
        match self {
            Event::Tick(e) => &e.ticker,
            Event::Bar(e) => &e.ticker,
            Event::Signal(e) => &e.ticker,
            Event::Order(e) => &e.ticker,
            Event::Fill(e) => &e.ticker,
        }
    }
}
