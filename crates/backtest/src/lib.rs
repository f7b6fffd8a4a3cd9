//! Event replay and backtesting for the tape engine.
//!
//! This crate provides:
//! - The FIFO dispatch loop over the shared event queue
//! - Handler interfaces for strategy, portfolio and execution
//! - A brokerage commission model
//! - Simulated order execution

pub mod commission;
pub mod engine;
pub mod execution;
pub mod handlers;

pub use engine::{ReplayEngine, ReplaySummary};
pub use execution::{SimulatedExecution, SimulatedExecutionConfig};
pub use handlers::{
    BuyAndHoldStrategy, ExecutionHandler, NaivePortfolio, Portfolio, Strategy,
};
