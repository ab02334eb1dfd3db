//! Reconciliation of broker-confirmed facts against the entity store.
//!
//! Facts may arrive late, duplicated, or out of order. Application is
//! idempotent (fill lots are cumulative, duplicates are absorbed) and
//! commutative where it matters: a positive fill always wins over a
//! cancel confirmation, even when the cancel arrived first. Facts that
//! address no known entity are logged and discarded, never errors.

use crate::broker::BrokerFact;
use crate::store::{EntityStore, TradeRef};
use rq_core::{Lots, Symbol, TradeState};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Apply one fact to the store. Returns the handles of every entity
/// the fact touched, so the caller can refresh its side bookkeeping.
pub fn apply_fact(store: &mut EntityStore, fact: &BrokerFact, now_ms: u64) -> Vec<TradeRef> {
    match fact {
        BrokerFact::Acknowledged { broker_id } => {
            with_trade(store, *broker_id, |r, t| {
                if t.state == TradeState::Submitted {
                    t.state = TradeState::Pending;
                    t.updated_at = now_ms;
                    info!(tag = %t.tag, broker_id, "Order acknowledged");
                    vec![r]
                } else {
                    debug!(tag = %t.tag, broker_id, state = %t.state, "Duplicate acknowledgment discarded");
                    vec![]
                }
            })
        }
        BrokerFact::Fill {
            broker_id,
            cumulative_lots,
            price,
        } => with_trade(store, *broker_id, |r, t| {
            if *cumulative_lots <= t.filled_lots {
                debug!(tag = %t.tag, broker_id, lots = %cumulative_lots, "Stale or duplicate fill discarded");
                return vec![];
            }
            let was = t.state;
            t.filled_lots = *cumulative_lots;
            t.open_price = *price;
            t.updated_at = now_ms;
            if was == TradeState::Cancelled {
                // Late fill on a confirmed cancel: the fill wins, and
                // the already-cancelled remainder shrinks the target so
                // either arrival order converges on the same record.
                warn!(tag = %t.tag, broker_id, lots = %t.filled_lots, "Fill arrived after cancel; reopening");
                if t.filled_lots >= t.target_lots {
                    t.target_lots = t.target_lots.max(t.filled_lots);
                    t.state = TradeState::Open;
                } else {
                    t.target_lots = t.filled_lots;
                    t.state = TradeState::PartiallyFilled;
                }
            } else {
                // Broker truth: an overfill raises the target rather
                // than being clamped away.
                t.target_lots = t.target_lots.max(t.filled_lots);
                t.state = if t.is_fully_filled() {
                    TradeState::Open
                } else if was == TradeState::CancelRequested {
                    // Cancel outcome still outstanding.
                    TradeState::CancelRequested
                } else {
                    TradeState::PartiallyFilled
                };
            }
            info!(
                tag = %t.tag,
                broker_id,
                filled = %t.filled_lots,
                target = %t.target_lots,
                price = %price,
                state = %t.state,
                "Fill applied"
            );
            vec![r]
        }),
        BrokerFact::CancelConfirmed { broker_id } => {
            with_trade(store, *broker_id, |r, t| {
                confirm_cancel(r, t, now_ms)
            })
        }
        BrokerFact::PartialCancel {
            broker_id,
            target_lots,
        } => with_trade(store, *broker_id, |r, t| {
            if t.state.is_terminal() {
                debug!(tag = %t.tag, broker_id, state = %t.state, "Partial cancel on terminal entity discarded");
                return vec![];
            }
            // Confirmed target never drops below what already filled.
            t.target_lots = (*target_lots).max(t.filled_lots);
            if t.state == TradeState::CancelRequested {
                t.state = if t.is_fully_filled() {
                    TradeState::Open
                } else if t.filled_lots.is_positive() {
                    TradeState::PartiallyFilled
                } else {
                    TradeState::Pending
                };
            }
            t.updated_at = now_ms;
            info!(tag = %t.tag, broker_id, target = %t.target_lots, state = %t.state, "Partial cancel applied");
            vec![r]
        }),
        BrokerFact::Rejected { broker_id, reason } => {
            with_trade(store, *broker_id, |r, t| {
                if t.filled_lots.is_positive() || t.state.is_terminal() {
                    debug!(tag = %t.tag, broker_id, state = %t.state, "Rejection discarded");
                    return vec![];
                }
                t.state = TradeState::Rejected;
                t.updated_at = now_ms;
                warn!(tag = %t.tag, broker_id, reason, "Order rejected");
                vec![r]
            })
        }
        BrokerFact::Closed {
            broker_id,
            price,
            profit,
            commission,
        } => with_trade(store, *broker_id, |r, t| {
            if t.state == TradeState::Closed {
                debug!(tag = %t.tag, broker_id, "Duplicate close discarded");
                return vec![];
            }
            t.close_price = *price;
            t.profit = *profit;
            t.commission = *commission;
            t.state = TradeState::Closed;
            t.updated_at = now_ms;
            info!(tag = %t.tag, broker_id, price = %price, profit = %profit, "Position closed");
            vec![r]
        }),
        BrokerFact::PositionSnapshot { symbol, lots } => {
            compare_position(store, symbol, *lots);
            vec![]
        }
        BrokerFact::OrderMassStatus { live_ids } => {
            reconcile_mass_status(store, live_ids, now_ms)
        }
    }
}

/// Cancel confirmation. Nothing filled terminalizes the entity; a
/// partially filled entity keeps its fills with the target clamped
/// down to them, since the cancelled remainder will never fill.
fn confirm_cancel(r: TradeRef, t: &mut rq_core::Trade, now_ms: u64) -> Vec<TradeRef> {
    if t.state.is_terminal() || t.state == TradeState::Open || t.state == TradeState::Closed {
        debug!(tag = %t.tag, state = %t.state, "Cancel confirmation discarded");
        return vec![];
    }
    if t.filled_lots.is_positive() {
        t.target_lots = t.filled_lots;
        t.state = TradeState::PartiallyFilled;
        info!(tag = %t.tag, filled = %t.filled_lots, "Remainder cancelled; fills kept");
    } else {
        t.state = TradeState::Cancelled;
        info!(tag = %t.tag, "Cancel confirmed");
    }
    t.updated_at = now_ms;
    vec![r]
}

/// Compare the broker's net position against the locally derived one.
/// Divergence is reported, never auto-corrected.
fn compare_position(store: &EntityStore, symbol: &Symbol, broker_lots: Lots) {
    let local: Decimal = store
        .iter()
        .filter(|(_, t)| t.state != TradeState::Closed)
        .map(|(_, t)| t.filled_lots.inner() * Decimal::from(t.direction.sign()))
        .sum();
    if local == broker_lots.inner() {
        debug!(symbol = %symbol, lots = %broker_lots, "Position snapshot matches");
    } else {
        warn!(
            symbol = %symbol,
            broker = %broker_lots,
            local = %local,
            "Position snapshot diverges from local state"
        );
    }
}

/// Terminalize any locally live order the broker no longer knows
/// about. Guards against stale references surviving a missed cancel
/// confirmation or a reconnect.
fn reconcile_mass_status(store: &mut EntityStore, live_ids: &[u64], now_ms: u64) -> Vec<TradeRef> {
    let stale: Vec<TradeRef> = store
        .iter()
        .filter(|(_, t)| {
            t.state.is_resting()
                && t.broker_id.is_some_and(|id| !live_ids.contains(&id))
        })
        .map(|(r, _)| r)
        .collect();

    let mut touched = Vec::new();
    for r in stale {
        if let Some(t) = store.get_mut(r) {
            warn!(tag = %t.tag, broker_id = ?t.broker_id, state = %t.state, "Order missing from broker status; terminalizing");
            touched.extend(confirm_cancel(r, t, now_ms));
        }
    }
    touched
}

fn with_trade<F>(store: &mut EntityStore, broker_id: u64, f: F) -> Vec<TradeRef>
where
    F: FnOnce(TradeRef, &mut rq_core::Trade) -> Vec<TradeRef>,
{
    match store.find_by_broker_id(broker_id) {
        Some(r) => match store.get_mut(r) {
            Some(t) => f(r, t),
            None => vec![],
        },
        None => {
            warn!(broker_id, "Fact addresses no known order; discarded");
            vec![]
        }
    }
}
