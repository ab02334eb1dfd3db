//! Instrument identity and per-cycle market state.
//!
//! An `Instrument` carries the static pricing parameters (pip size,
//! tick grid) configured once at start; `TopOfBook` is the live best
//! bid/ask refreshed every cycle from the market-data feed.

use crate::error::{CoreError, Result};
use crate::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument symbol (e.g. "EURUSD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Static pricing parameters for one instrument.
///
/// Immutable after construction; only the top-of-book changes cycle
/// to cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Symbol identity.
    pub symbol: Symbol,
    /// Pip size (quote distance unit).
    pub pip: Decimal,
    /// Tick grid for price rounding.
    pub tick_grid: Decimal,
}

impl Instrument {
    /// Create a validated instrument.
    ///
    /// `pip` and `tick_grid` must be strictly positive; these are the
    /// only fatal checks in the system and happen here, once.
    pub fn new(symbol: Symbol, pip: Decimal, tick_grid: Decimal) -> Result<Self> {
        if pip <= Decimal::ZERO {
            return Err(CoreError::InvalidPip(pip.to_string()));
        }
        if tick_grid <= Decimal::ZERO {
            return Err(CoreError::InvalidTickGrid(tick_grid.to_string()));
        }
        Ok(Self {
            symbol,
            pip,
            tick_grid,
        })
    }
}

/// State of the top-of-book for quoting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    /// Both sides present, bid < ask.
    Valid,
    /// A side is zero or missing.
    Incomplete,
    /// Crossed or otherwise unusable.
    Crossed,
}

impl BookState {
    /// Whether quoting decisions may be taken on this book.
    pub fn is_quotable(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Best bid/ask for an instrument, refreshed each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    /// Best bid price.
    pub bid: Price,
    /// Best ask price.
    pub ask: Price,
}

impl TopOfBook {
    pub fn new(bid: Price, ask: Price) -> Self {
        Self { bid, ask }
    }

    /// Spread: ask - bid.
    pub fn spread(&self) -> Decimal {
        self.ask.inner() - self.bid.inner()
    }

    /// Classify the book. An invalid book suppresses quoting for the
    /// cycle rather than raising an error.
    pub fn state(&self) -> BookState {
        if !self.bid.is_positive() || !self.ask.is_positive() {
            return BookState::Incomplete;
        }
        if self.bid >= self.ask {
            return BookState::Crossed;
        }
        BookState::Valid
    }

    pub fn is_valid(&self) -> bool {
        self.state().is_quotable()
    }
}
