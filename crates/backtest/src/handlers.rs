//! Handler interfaces for the dispatch loop, plus reference implementations.
//!
//! Handlers never touch the queue directly: each returns the events it
//! produces and the driver enqueues them, keeping ordering centrally
//! enforced.

use tape_core::{
    Event, FillEvent, OrderEvent, OrderType, Quantity, Side, SignalEvent, Ticker,
};
use tape_feed::PriceSnapshot;

/// Consumes market events, produces signals.
pub trait Strategy {
    fn on_market(&mut self, event: &Event) -> Vec<SignalEvent>;
}

/// Consumes signals and fills, produces orders.
pub trait Portfolio {
    fn on_signal(&mut self, signal: &SignalEvent) -> Vec<OrderEvent>;
    fn on_fill(&mut self, fill: &FillEvent);
}

/// Consumes orders, produces fills.
///
/// The driver supplies the instrument's last-known prices so the handler
/// holds no reference into the price source.
pub trait ExecutionHandler {
    fn on_order(&mut self, order: &OrderEvent, last: &PriceSnapshot) -> Vec<FillEvent>;
}

/// Goes long once on the first market event for its ticker, then holds
/// until the replay completes.
pub struct BuyAndHoldStrategy {
    ticker: Ticker,
    base_quantity: Quantity,
    invested: bool,
    bars_seen: u64,
}

impl BuyAndHoldStrategy {
    pub fn new(ticker: impl Into<Ticker>, base_quantity: Quantity) -> Self {
        Self {
            ticker: ticker.into(),
            base_quantity,
            invested: false,
            bars_seen: 0,
        }
    }

    /// Market events seen for this strategy's ticker.
    pub fn bars_seen(&self) -> u64 {
        self.bars_seen
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn on_market(&mut self, event: &Event) -> Vec<SignalEvent> {
        let time = match event {
            Event::Bar(bar) if bar.ticker == self.ticker => bar.time,
            Event::Tick(tick) if tick.ticker == self.ticker => tick.time,
            _ => return Vec::new(),
        };
        self.bars_seen += 1;
        if self.invested {
            return Vec::new();
        }
        self.invested = true;
        vec![SignalEvent {
            ticker: self.ticker.clone(),
            side: Side::Buy,
            time,
            suggested_quantity: Some(self.base_quantity),
        }]
    }
}

/// Converts every signal into a single market order and records fills.
///
/// No sizing or risk logic; just enough portfolio to exercise the full
/// signal → order → fill chain.
pub struct NaivePortfolio {
    base_quantity: Quantity,
    fills: Vec<FillEvent>,
}

impl NaivePortfolio {
    pub fn new(base_quantity: Quantity) -> Self {
        Self {
            base_quantity,
            fills: Vec::new(),
        }
    }

    /// Fills received so far, in arrival order.
    pub fn fills(&self) -> &[FillEvent] {
        &self.fills
    }
}

impl Portfolio for NaivePortfolio {
    fn on_signal(&mut self, signal: &SignalEvent) -> Vec<OrderEvent> {
        vec![OrderEvent {
            ticker: signal.ticker.clone(),
            side: signal.side,
            quantity: signal.suggested_quantity.unwrap_or(self.base_quantity),
            order_type: OrderType::Market,
        }]
    }

    fn on_fill(&mut self, fill: &FillEvent) {
        self.fills.push(fill.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tape_core::{BarEvent, FixedPrice, SECONDS_PER_DAY};

    fn make_bar(ticker: &str, time: i64) -> Event {
        let price = FixedPrice::from_f64(2.5);
        Event::Bar(BarEvent {
            ticker: ticker.to_string(),
            time,
            period_secs: SECONDS_PER_DAY,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000,
            adj_close: Some(price),
        })
    }

    #[test]
    fn test_buy_and_hold_signals_once() {
        let mut strategy = BuyAndHoldStrategy::new("SPY", 100);

        let signals = strategy.on_market(&make_bar("SPY", 1));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].side, Side::Buy);
        assert_eq!(signals[0].suggested_quantity, Some(100));

        assert!(strategy.on_market(&make_bar("SPY", 2)).is_empty());
        assert!(strategy.on_market(&make_bar("SPY", 3)).is_empty());
        assert_eq!(strategy.bars_seen(), 3);
    }

    #[test]
    fn test_buy_and_hold_ignores_other_tickers() {
        let mut strategy = BuyAndHoldStrategy::new("SPY", 100);
        assert!(strategy.on_market(&make_bar("AGG", 1)).is_empty());
        assert_eq!(strategy.bars_seen(), 0);
        // first SPY bar still triggers the entry
        assert_eq!(strategy.on_market(&make_bar("SPY", 2)).len(), 1);
    }

    #[test]
    fn test_naive_portfolio_order_sizing() {
        let mut portfolio = NaivePortfolio::new(50);
        let signal = SignalEvent {
            ticker: "SPY".to_string(),
            side: Side::Sell,
            time: 1,
            suggested_quantity: None,
        };
        let orders = portfolio.on_signal(&signal);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity, 50);
        assert_eq!(orders[0].order_type, OrderType::Market);

        let sized = SignalEvent {
            suggested_quantity: Some(200),
            ..signal
        };
        assert_eq!(portfolio.on_signal(&sized)[0].quantity, 200);
    }
}
