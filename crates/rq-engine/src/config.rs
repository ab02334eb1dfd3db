//! Quoter configuration.

use rq_core::{CoreError, Instrument, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transport style for partial cancels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelStyle {
    /// Cancel the remainder and submit a fresh order with reduced lots
    /// (same two-step mechanism as a drift requote).
    #[default]
    CancelReplace,
    /// Single amend command carrying the reduced lot count.
    Amend,
}

/// Per-instrument quoting configuration.
///
/// Loaded once at start and read-only thereafter. `validate()` holds
/// the only fatal checks in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoterConfig {
    /// Instrument symbol.
    pub symbol: String,

    /// Pip size (quote distance unit).
    #[serde(default = "default_pip")]
    pub pip: Decimal,

    /// Tick grid for target price rounding.
    #[serde(default = "default_tick_grid")]
    pub tick_grid: Decimal,

    /// Depth offset from top-of-book, in pips.
    #[serde(default = "default_depth_pips")]
    pub depth_pips: Decimal,

    /// Drift tolerance, in pips. A resting quote within this distance
    /// of the fresh target is left alone to avoid cancel/replace churn.
    #[serde(default = "default_tolerance_pips")]
    pub tolerance_pips: Decimal,

    /// Lots per quote.
    #[serde(default = "default_lots")]
    pub lots: Decimal,

    /// How operator partial cancels are transported to the broker.
    #[serde(default)]
    pub partial_cancel_style: CancelStyle,
}

impl QuoterConfig {
    /// Validate the startup invariants: positive pip/grid/lots,
    /// non-negative depth and tolerance.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tick_grid <= Decimal::ZERO {
            return Err(CoreError::InvalidTickGrid(self.tick_grid.to_string()));
        }
        if self.pip <= Decimal::ZERO {
            return Err(CoreError::InvalidPip(self.pip.to_string()));
        }
        if self.depth_pips < Decimal::ZERO {
            return Err(CoreError::InvalidDepth(self.depth_pips.to_string()));
        }
        if self.tolerance_pips < Decimal::ZERO {
            return Err(CoreError::InvalidTolerance(self.tolerance_pips.to_string()));
        }
        if self.lots <= Decimal::ZERO {
            return Err(CoreError::InvalidLots(self.lots.to_string()));
        }
        Ok(())
    }

    /// Drift tolerance as a price distance.
    pub fn tolerance(&self) -> Decimal {
        self.tolerance_pips * self.pip
    }

    /// Build the validated instrument.
    pub fn instrument(&self) -> Result<Instrument, CoreError> {
        self.validate()?;
        Instrument::new(Symbol::new(self.symbol.clone()), self.pip, self.tick_grid)
    }
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            pip: default_pip(),
            tick_grid: default_tick_grid(),
            depth_pips: default_depth_pips(),
            tolerance_pips: default_tolerance_pips(),
            lots: default_lots(),
            partial_cancel_style: CancelStyle::default(),
        }
    }
}

fn default_pip() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}
fn default_tick_grid() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}
fn default_depth_pips() -> Decimal {
    Decimal::new(2, 0) // 2 pips off top-of-book
}
fn default_tolerance_pips() -> Decimal {
    Decimal::ONE // 1 pip
}
fn default_lots() -> Decimal {
    Decimal::ONE
}
