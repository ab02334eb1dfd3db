//! Core domain types for the resting-quote lifecycle manager.
//!
//! This crate provides the fundamental types used throughout the
//! quoting system:
//! - `Price`, `Lots`: precision-safe numeric types
//! - `round_up`/`round_down`: tick-grid rounding
//! - `Instrument`, `TopOfBook`: static parameters and live market state
//! - `Trade`, `TradeState`: the order/trade entity and its lifecycle

pub mod decimal;
pub mod error;
pub mod instrument;
pub mod order;
pub mod tick;

pub use decimal::{Lots, Price};
pub use error::{CoreError, Result};
pub use instrument::{BookState, Instrument, Symbol, TopOfBook};
pub use order::{Direction, FillClass, QuoteSide, Trade, TradeState, TradeTag};
pub use tick::{round_down, round_up};
