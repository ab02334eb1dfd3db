//! Engine error types.
//!
//! Broker-call failures are non-fatal to the quoting cycle: they are
//! surfaced to the caller (operator actions) or logged (cycle
//! actions), and never abort processing of the other side.

use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Cancel command reported failure; the entity keeps its prior
    /// state and the caller may retry manually.
    #[error("Cancel failed for broker order {broker_id}")]
    CancelFailed { broker_id: u64 },

    /// Close command reported failure.
    #[error("Close failed for broker order {broker_id}")]
    CloseFailed { broker_id: u64 },

    /// The referenced entity is gone or its handle generation is stale.
    #[error("Unknown or stale order reference")]
    UnknownOrder,

    /// Close guard: entity is not in the open state.
    #[error("Order is not open (state: {state})")]
    NotOpen { state: rq_core::TradeState },

    /// Cancel guard: entity is not resting at the broker.
    #[error("Order is not resting (state: {state})")]
    NotResting { state: rq_core::TradeState },

    /// Close guard: the broker reports no position linked to the order.
    #[error("No broker position linked to order {broker_id}")]
    NoPositionLink { broker_id: u64 },

    /// The entity was never acknowledged, so there is nothing to
    /// address at the broker.
    #[error("Order has no broker identifier")]
    Unacknowledged,
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
