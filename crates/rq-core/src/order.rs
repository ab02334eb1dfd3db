//! Order/trade entity and lifecycle states.
//!
//! A `Trade` is created when a submission is handed to the broker
//! layer and lives in the entity store until it reaches a terminal
//! state. State transitions are applied by the reconciliation layer
//! (broker-confirmed facts) and the quote manager (local intents);
//! nothing else mutates these records.

use crate::{Lots, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quoted side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSide {
    Bid,
    Ask,
}

impl QuoteSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }

    /// Trade direction opened by a fill on this side.
    pub fn direction(&self) -> Direction {
        match self {
            Self::Bid => Direction::Long,
            Self::Ask => Direction::Short,
        }
    }
}

impl fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// Returns 1 for long, -1 for short (for exposure calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Local trade tag for log correlation.
///
/// Assigned before submission, unlike the broker identifier which only
/// exists once the broker acknowledges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeTag(String);

impl TradeTag {
    /// Format: `rq_{timestamp_ms}_{uuid_short}`.
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("rq_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TradeTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a trade. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TradeState {
    /// Handed to the broker layer, no acknowledgment yet.
    #[default]
    Submitted,
    /// Broker declined the order. Terminal.
    Rejected,
    /// Acknowledged, resting, unfilled.
    Pending,
    /// Fill reported with filled lots < target lots.
    PartiallyFilled,
    /// Fully filled; position open.
    Open,
    /// Local cancel issued, confirmation outstanding.
    CancelRequested,
    /// Cancel confirmed with nothing filled. Terminal.
    Cancelled,
    /// Position exited. Terminal.
    Closed,
    /// No broker identifier was ever assigned. Terminal.
    Missed,
}

impl TradeState {
    /// Terminal states never transition again (except a late fill
    /// overriding a cancel, handled by reconciliation).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Cancelled | Self::Closed | Self::Missed
        )
    }

    /// Resting at the broker: live limit order with unfilled remainder.
    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::PartiallyFilled | Self::CancelRequested
        )
    }

    /// Still live in some form (resting, in flight, or open).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
            Self::PartiallyFilled => "partially_filled",
            Self::Open => "open",
            Self::CancelRequested => "cancel_requested",
            Self::Cancelled => "cancelled",
            Self::Closed => "closed",
            Self::Missed => "missed",
        };
        write!(f, "{s}")
    }
}

/// Observability classification of a trade, derived purely from its
/// fields. Reported through the fill-notification hook; carries no
/// side effects beyond logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillClass {
    /// Never acknowledged by the broker.
    Missed,
    /// Resting with no fill yet.
    Pending,
    /// Some or all lots filled.
    Open,
    /// Ended without a single filled lot.
    Unfilled,
}

impl fmt::Display for FillClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missed => "missed",
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Unfilled => "unfilled",
        };
        write!(f, "{s}")
    }
}

/// A tracked order/trade record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Local tag, assigned before submission.
    pub tag: TradeTag,
    /// Broker-assigned identifier; `None` until acknowledged.
    pub broker_id: Option<u64>,
    /// Trade direction.
    pub direction: Direction,
    /// Lots originally requested.
    pub requested_lots: Lots,
    /// Cumulative lots filled so far.
    pub filled_lots: Lots,
    /// Lots still targeted; shrinks on partial cancel.
    pub target_lots: Lots,
    /// Limit price; zero denotes a market order.
    pub limit_price: Price,
    /// Average open price once filled.
    pub open_price: Price,
    /// Close price once exited.
    pub close_price: Price,
    /// Realized profit.
    pub profit: Decimal,
    /// Commission charged.
    pub commission: Decimal,
    /// Current lifecycle state.
    pub state: TradeState,
    /// Creation timestamp (Unix milliseconds).
    pub created_at: u64,
    /// Last update timestamp (Unix milliseconds).
    pub updated_at: u64,
}

impl Trade {
    /// Create a new trade record in `Submitted` state.
    pub fn new(direction: Direction, lots: Lots, limit_price: Price, now_ms: u64) -> Self {
        Self {
            tag: TradeTag::new(),
            broker_id: None,
            direction,
            requested_lots: lots,
            filled_lots: Lots::ZERO,
            target_lots: lots,
            limit_price,
            open_price: Price::ZERO,
            close_price: Price::ZERO,
            profit: Decimal::ZERO,
            commission: Decimal::ZERO,
            state: TradeState::Submitted,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Unfilled remainder.
    pub fn remaining_lots(&self) -> Lots {
        self.target_lots - self.filled_lots
    }

    pub fn is_fully_filled(&self) -> bool {
        !self.filled_lots.is_zero() && self.filled_lots >= self.target_lots
    }

    /// Derive the observability classification from the record.
    pub fn classification(&self) -> FillClass {
        if self.broker_id.is_none() {
            FillClass::Missed
        } else if self.filled_lots.is_positive() {
            FillClass::Open
        } else if self.state.is_terminal() {
            FillClass::Unfilled
        } else {
            FillClass::Pending
        }
    }
}
