//! Simulated order execution.
//!
//! Fills orders at the instrument's last-known close with formula
//! commission. No order-book depth, latency or slippage model; market and
//! limit orders fill identically.

use tape_core::{FillEvent, OrderEvent};
use tape_feed::PriceSnapshot;

use crate::commission;
use crate::handlers::ExecutionHandler;

/// Configuration for simulated execution.
#[derive(Debug, Clone)]
pub struct SimulatedExecutionConfig {
    /// Exchange name stamped on fills.
    pub exchange: String,
}

impl Default for SimulatedExecutionConfig {
    fn default() -> Self {
        Self {
            exchange: "ARCA".to_string(),
        }
    }
}

/// Execution handler that fills every order against the latest snapshot.
pub struct SimulatedExecution {
    config: SimulatedExecutionConfig,
}

impl SimulatedExecution {
    pub fn new(config: SimulatedExecutionConfig) -> Self {
        Self { config }
    }
}

impl Default for SimulatedExecution {
    fn default() -> Self {
        Self::new(SimulatedExecutionConfig::default())
    }
}

impl ExecutionHandler for SimulatedExecution {
    fn on_order(&mut self, order: &OrderEvent, last: &PriceSnapshot) -> Vec<FillEvent> {
        let fill_cost = last.close;
        vec![FillEvent {
            time: last.timestamp,
            ticker: order.ticker.clone(),
            exchange: self.config.exchange.clone(),
            quantity: order.quantity,
            side: order.side,
            fill_cost,
            commission: commission::for_fill(None, order.quantity, fill_cost),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tape_core::{FixedPrice, OrderType, Side};

    fn make_snapshot(close: f64, timestamp: i64) -> PriceSnapshot {
        PriceSnapshot {
            close: FixedPrice::from_f64(close),
            adj_close: FixedPrice::from_f64(close),
            timestamp,
        }
    }

    #[test]
    fn test_market_order_fills_at_last_close() {
        let mut execution = SimulatedExecution::default();
        let order = OrderEvent {
            ticker: "SPY".to_string(),
            side: Side::Buy,
            quantity: 100,
            order_type: OrderType::Market,
        };

        let fills = execution.on_order(&order, &make_snapshot(10.0, 42));
        assert_eq!(fills.len(), 1);
        let fill = &fills[0];
        assert_eq!(fill.ticker, "SPY");
        assert_eq!(fill.exchange, "ARCA");
        assert_eq!(fill.time, 42);
        assert_eq!(fill.quantity, 100);
        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.fill_cost, FixedPrice::from_f64(10.0));
        assert_eq!(fill.commission, FixedPrice::from_f64(1.30));
    }

    #[test]
    fn test_exchange_name_is_configurable() {
        let mut execution = SimulatedExecution::new(SimulatedExecutionConfig {
            exchange: "SIM".to_string(),
        });
        let order = OrderEvent {
            ticker: "AGG".to_string(),
            side: Side::Sell,
            quantity: 1000,
            order_type: OrderType::Limit,
        };

        let fills = execution.on_order(&order, &make_snapshot(1.0, 7));
        assert_eq!(fills[0].exchange, "SIM");
        // cheap large order hits the notional cap
        assert_eq!(fills[0].commission, FixedPrice::from_f64(5.0));
    }
}
