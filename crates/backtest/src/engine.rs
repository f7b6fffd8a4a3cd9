//! Event replay driver.
//!
//! Owns the queue and enforces the consumption discipline: drain the queue
//! completely, routing each event by kind, then admit exactly one new
//! market event. Every signal, order and fill causally triggered by one
//! bar is fully processed before the next bar becomes visible.

use tracing::{info, warn};

use tape_core::{Event, EventQueue};
use tape_feed::PriceSource;

use crate::handlers::{ExecutionHandler, Portfolio, Strategy};

/// Event counts from a completed replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub bars: u64,
    pub ticks: u64,
    pub signals: u64,
    pub orders: u64,
    pub fills: u64,
}

impl ReplaySummary {
    /// Total events dispatched.
    pub fn total(&self) -> u64 {
        self.bars + self.ticks + self.signals + self.orders + self.fills
    }
}

/// Single-threaded replay driver over one source and one handler set.
///
/// Determinism depends on there being exactly one consumer draining the
/// queue; workers parallelizing independent backtests must each own their
/// engine, source and queue.
pub struct ReplayEngine<D, S, P, X> {
    source: D,
    strategy: S,
    portfolio: P,
    execution: X,
    queue: EventQueue,
    summary: ReplaySummary,
}

impl<D, S, P, X> ReplayEngine<D, S, P, X>
where
    D: PriceSource,
    S: Strategy,
    P: Portfolio,
    X: ExecutionHandler,
{
    pub fn new(source: D, strategy: S, portfolio: P, execution: X) -> Self {
        Self {
            source,
            strategy,
            portfolio,
            execution,
            queue: EventQueue::new(),
            summary: ReplaySummary::default(),
        }
    }

    /// Drive the replay until the source is exhausted and the queue is
    /// drained, then report what was dispatched.
    pub fn run(&mut self) -> ReplaySummary {
        loop {
            while let Some(event) = self.queue.try_dequeue() {
                self.dispatch(event);
            }
            if !self.source.continue_backtest() {
                break;
            }
            self.source.stream_next(&mut self.queue);
        }
        info!(
            bars = self.summary.bars,
            signals = self.summary.signals,
            orders = self.summary.orders,
            fills = self.summary.fills,
            "replay complete"
        );
        self.summary
    }

    fn dispatch(&mut self, event: Event) {
        match &event {
            Event::Bar(_) => {
                self.summary.bars += 1;
                self.route_market(&event);
            }
            Event::Tick(_) => {
                self.summary.ticks += 1;
                self.route_market(&event);
            }
            Event::Signal(signal) => {
                self.summary.signals += 1;
                for order in self.portfolio.on_signal(signal) {
                    self.queue.enqueue(Event::Order(order));
                }
            }
            Event::Order(order) => {
                self.summary.orders += 1;
                match self.source.latest_price(&order.ticker) {
                    Ok(last) => {
                        for fill in self.execution.on_order(order, &last) {
                            self.queue.enqueue(Event::Fill(fill));
                        }
                    }
                    Err(_) => {
                        warn!(ticker = %order.ticker, "dropping order: no known price");
                    }
                }
            }
            Event::Fill(fill) => {
                self.summary.fills += 1;
                self.portfolio.on_fill(fill);
            }
        }
    }

    fn route_market(&mut self, event: &Event) {
        for signal in self.strategy.on_market(event) {
            self.queue.enqueue(Event::Signal(signal));
        }
    }

    /// The price source, e.g. for latest-price queries after the run.
    pub fn source(&self) -> &D {
        &self.source
    }

    /// The portfolio handler.
    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }

    /// The strategy handler.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}
