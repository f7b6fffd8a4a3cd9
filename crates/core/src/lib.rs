//! Core types and configuration for the tape replay engine.
//!
//! This crate provides shared types used across all other crates:
//! - Fixed-point price representation
//! - The closed event model
//! - The FIFO event queue
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod price;
pub mod queue;
pub mod types;

pub use config::{DataConfig, ExecutionConfig, ReplayConfig};
pub use error::{Error, Result};
pub use event::{
    BarEvent, Event, EventType, FillEvent, OrderEvent, OrderType, Side, SignalEvent, TickEvent,
};
pub use price::{FixedPrice, PRICE_MULTIPLIER};
pub use queue::EventQueue;
pub use types::*;
