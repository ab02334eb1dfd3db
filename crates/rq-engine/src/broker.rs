//! Broker gateway trait and confirmed-fact events.
//!
//! The engine never talks to a transport directly. Everything it asks
//! of the outside world goes through [`BrokerGateway`]; everything the
//! outside world tells it comes back as a [`BrokerFact`]. Facts are
//! the only inputs that mutate entity state through reconciliation,
//! and they may arrive late, duplicated, or out of order.

use rq_core::{Direction, Lots, Price, Symbol, TradeTag};

/// A limit-order submission handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Local tag for log correlation.
    pub tag: TradeTag,
    pub symbol: Symbol,
    pub direction: Direction,
    pub lots: Lots,
    /// Limit price; zero requests a market order.
    pub limit_price: Price,
}

/// Synchronous command surface toward the broker.
///
/// `submit` returning `Some(id)` is the acknowledgment: the order is
/// live under that identifier. `None` means the attempt produced no
/// addressable order. `cancel` returning `true` only means the command
/// was accepted; the confirmed outcome arrives later as a fact.
pub trait BrokerGateway {
    /// Submit an order. Returns the broker identifier on acceptance.
    fn submit(&mut self, request: &OrderRequest) -> Option<u64>;

    /// Cancel an order, fully (`None`) or down to `keep_lots`.
    fn cancel(&mut self, broker_id: u64, keep_lots: Option<Lots>) -> bool;

    /// Close an open position at market. Returns acceptance only.
    fn close_position(&mut self, position_id: u64, lots: Lots) -> bool;

    /// Net position for the symbol as the broker sees it, in signed
    /// lots (positive long).
    fn position(&self, symbol: &Symbol) -> Lots;

    /// Position identifier linked to a filled order, if the broker
    /// has established one.
    fn order_position_link(&self, broker_id: u64) -> Option<u64>;
}

/// A broker-confirmed event.
///
/// Fill lots are cumulative per order, never incremental, so a
/// replayed fill is absorbed without double counting.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerFact {
    /// Order accepted and resting.
    Acknowledged { broker_id: u64 },
    /// Cumulative fill progress on an order.
    Fill {
        broker_id: u64,
        cumulative_lots: Lots,
        price: Price,
    },
    /// Cancel confirmed; the order no longer rests.
    CancelConfirmed { broker_id: u64 },
    /// Partial cancel confirmed down to the new target.
    PartialCancel { broker_id: u64, target_lots: Lots },
    /// Order declined.
    Rejected { broker_id: u64, reason: String },
    /// Position exited.
    Closed {
        broker_id: u64,
        price: Price,
        profit: rust_decimal::Decimal,
        commission: rust_decimal::Decimal,
    },
    /// Broker-side net position for comparison against local state.
    PositionSnapshot { symbol: Symbol, lots: Lots },
    /// Full set of order identifiers the broker considers live.
    OrderMassStatus { live_ids: Vec<u64> },
}

impl BrokerFact {
    /// Broker identifier the fact addresses, if it addresses one.
    pub fn broker_id(&self) -> Option<u64> {
        match self {
            Self::Acknowledged { broker_id }
            | Self::Fill { broker_id, .. }
            | Self::CancelConfirmed { broker_id }
            | Self::PartialCancel { broker_id, .. }
            | Self::Rejected { broker_id, .. }
            | Self::Closed { broker_id, .. } => Some(*broker_id),
            Self::PositionSnapshot { .. } | Self::OrderMassStatus { .. } => None,
        }
    }
}
