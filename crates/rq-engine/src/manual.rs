//! Operator commands against tracked orders.
//!
//! These run outside the quoting cycle and return errors instead of
//! logging them, so the operator surface can report failures directly.
//! State changes here are local intent only; confirmed outcomes still
//! arrive as facts through reconciliation.

use crate::broker::{BrokerGateway, OrderRequest};
use crate::config::CancelStyle;
use crate::error::{EngineError, EngineResult};
use crate::manager::QuoteManager;
use crate::store::TradeRef;
use rq_core::{Lots, Trade, TradeState};
use tracing::{info, warn};

impl QuoteManager {
    /// Cancel a resting order, fully (`keep_lots = None`) or down to
    /// `keep_lots` total lots.
    ///
    /// A partial cancel below what already filled is clamped up to the
    /// filled amount; one at or above the current target is a no-op.
    pub fn manual_cancel(
        &mut self,
        r: TradeRef,
        keep_lots: Option<Lots>,
        broker: &mut dyn BrokerGateway,
    ) -> EngineResult<()> {
        let t = self.store().get(r).ok_or(EngineError::UnknownOrder)?;
        if !t.state.is_resting() {
            return Err(EngineError::NotResting { state: t.state });
        }
        let broker_id = t.broker_id.ok_or(EngineError::Unacknowledged)?;

        match keep_lots {
            None => self.full_cancel(r, broker_id, broker),
            Some(keep) => {
                let keep = keep.max(t.filled_lots);
                if keep >= t.target_lots {
                    info!(broker_id, %keep, "Partial cancel is a no-op at current target");
                    return Ok(());
                }
                match self.config().partial_cancel_style {
                    CancelStyle::Amend => self.amend_down(r, broker_id, keep, broker),
                    CancelStyle::CancelReplace => {
                        self.cancel_and_replace(r, broker_id, keep, broker)
                    }
                }
            }
        }
    }

    /// Close an open position at market.
    pub fn manual_close(
        &mut self,
        r: TradeRef,
        broker: &mut dyn BrokerGateway,
    ) -> EngineResult<()> {
        let t = self.store().get(r).ok_or(EngineError::UnknownOrder)?;
        if t.state != TradeState::Open {
            return Err(EngineError::NotOpen { state: t.state });
        }
        let broker_id = t.broker_id.ok_or(EngineError::Unacknowledged)?;
        let position_id = broker
            .order_position_link(broker_id)
            .ok_or(EngineError::NoPositionLink { broker_id })?;

        if broker.close_position(position_id, t.filled_lots) {
            info!(broker_id, position_id, "Close command accepted");
            Ok(())
        } else {
            Err(EngineError::CloseFailed { broker_id })
        }
    }

    /// Issue a full cancel for every resting order. Returns how many
    /// cancel commands the broker accepted; refusals are logged and
    /// skipped rather than aborting the batch.
    pub fn manual_cancel_all(&mut self, broker: &mut dyn BrokerGateway) -> usize {
        let resting: Vec<(TradeRef, u64)> = self
            .store()
            .iter()
            .filter(|(_, t)| t.state.is_resting() && t.state != TradeState::CancelRequested)
            .filter_map(|(r, t)| t.broker_id.map(|id| (r, id)))
            .collect();

        let mut accepted = 0;
        for (r, broker_id) in resting {
            match self.full_cancel(r, broker_id, broker) {
                Ok(()) => accepted += 1,
                Err(e) => warn!(broker_id, error = %e, "Cancel skipped"),
            }
        }
        info!(accepted, "Cancel-all issued");
        accepted
    }

    fn full_cancel(
        &mut self,
        r: TradeRef,
        broker_id: u64,
        broker: &mut dyn BrokerGateway,
    ) -> EngineResult<()> {
        if !broker.cancel(broker_id, None) {
            return Err(EngineError::CancelFailed { broker_id });
        }
        if let Some(t) = self.store_mut().get_mut(r) {
            t.state = TradeState::CancelRequested;
        }
        info!(broker_id, "Cancel command accepted");
        Ok(())
    }

    fn amend_down(
        &mut self,
        r: TradeRef,
        broker_id: u64,
        keep: Lots,
        broker: &mut dyn BrokerGateway,
    ) -> EngineResult<()> {
        if !broker.cancel(broker_id, Some(keep)) {
            return Err(EngineError::CancelFailed { broker_id });
        }
        if let Some(t) = self.store_mut().get_mut(r) {
            t.state = TradeState::CancelRequested;
        }
        info!(broker_id, %keep, "Amend command accepted");
        Ok(())
    }

    /// Two-step partial cancel: cancel the whole order, then submit a
    /// fresh one for the reduced remainder at the same price. Shares
    /// the non-atomic window of a drift requote.
    fn cancel_and_replace(
        &mut self,
        r: TradeRef,
        broker_id: u64,
        keep: Lots,
        broker: &mut dyn BrokerGateway,
    ) -> EngineResult<()> {
        let (direction, filled, limit_price, stamp) = {
            let t = self.store().get(r).ok_or(EngineError::UnknownOrder)?;
            (t.direction, t.filled_lots, t.limit_price, t.updated_at)
        };
        self.full_cancel(r, broker_id, broker)?;

        let lots = keep - filled;
        if lots.is_zero() {
            // Keeping only what already filled: the full cancel covers
            // it, there is no remainder to resubmit.
            info!(broker_id, %filled, "Nothing left to replace after cancel");
            return Ok(());
        }
        let mut trade = Trade::new(direction, lots, limit_price, stamp);
        let request = OrderRequest {
            tag: trade.tag.clone(),
            symbol: self.instrument().symbol.clone(),
            direction,
            lots,
            limit_price,
        };
        match broker.submit(&request) {
            Some(id) => {
                trade.broker_id = Some(id);
                trade.state = TradeState::Pending;
                info!(tag = %trade.tag, broker_id = id, %lots, "Reduced replacement resting");
                let new = self.store_mut().insert(trade);
                self.relink_resting(r, new);
                Ok(())
            }
            None => {
                trade.state = TradeState::Missed;
                warn!(tag = %trade.tag, %lots, "Reduced replacement missed");
                self.store_mut().insert(trade);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::BrokerFact;
    use crate::config::QuoterConfig;
    use rq_core::{Price, QuoteSide, Symbol, TopOfBook};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct LocalBroker {
        next_id: u64,
        refuse_cancels: bool,
        position_link: Option<u64>,
        cancels: Vec<(u64, Option<Lots>)>,
        submits: Vec<OrderRequest>,
        closes: Vec<(u64, Lots)>,
    }

    impl BrokerGateway for LocalBroker {
        fn submit(&mut self, request: &OrderRequest) -> Option<u64> {
            self.submits.push(request.clone());
            self.next_id += 1;
            Some(self.next_id)
        }
        fn cancel(&mut self, broker_id: u64, keep_lots: Option<Lots>) -> bool {
            self.cancels.push((broker_id, keep_lots));
            !self.refuse_cancels
        }
        fn close_position(&mut self, position_id: u64, lots: Lots) -> bool {
            self.closes.push((position_id, lots));
            true
        }
        fn position(&self, _symbol: &Symbol) -> Lots {
            Lots::ZERO
        }
        fn order_position_link(&self, _broker_id: u64) -> Option<u64> {
            self.position_link
        }
    }

    fn quoted_manager(style: CancelStyle) -> (QuoteManager, LocalBroker) {
        let config = QuoterConfig {
            symbol: "EURUSD".to_string(),
            lots: dec!(5),
            partial_cancel_style: style,
            ..Default::default()
        };
        let mut mgr = QuoteManager::new(config).unwrap();
        let mut broker = LocalBroker::default();
        let book = TopOfBook::new(Price::new(dec!(1.09990)), Price::new(dec!(1.10000)));
        mgr.on_tick(&book, 1_000, &mut broker);
        (mgr, broker)
    }

    #[test]
    fn test_manual_full_cancel() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());
        let r = mgr.resting(QuoteSide::Bid).unwrap();

        mgr.manual_cancel(r, None, &mut broker).unwrap();
        assert_eq!(broker.cancels, vec![(1, None)]);
        assert_eq!(
            mgr.store().get(r).unwrap().state,
            TradeState::CancelRequested
        );
    }

    #[test]
    fn test_manual_cancel_refused() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        broker.refuse_cancels = true;

        let err = mgr.manual_cancel(r, None, &mut broker).unwrap_err();
        assert!(matches!(err, EngineError::CancelFailed { broker_id: 1 }));
        // Entity keeps its prior state for a manual retry.
        assert_eq!(mgr.store().get(r).unwrap().state, TradeState::Pending);
    }

    #[test]
    fn test_partial_cancel_amend_style() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::Amend);
        let r = mgr.resting(QuoteSide::Bid).unwrap();

        mgr.manual_cancel(r, Some(Lots::new(dec!(2))), &mut broker)
            .unwrap();
        assert_eq!(broker.cancels, vec![(1, Some(Lots::new(dec!(2))))]);
        assert_eq!(broker.submits.len(), 2);
    }

    #[test]
    fn test_partial_cancel_replace_style() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::CancelReplace);
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        let old_price = mgr.store().get(r).unwrap().limit_price;

        mgr.manual_cancel(r, Some(Lots::new(dec!(2))), &mut broker)
            .unwrap();

        // Full cancel of the old order plus a reduced fresh one.
        assert_eq!(broker.cancels, vec![(1, None)]);
        assert_eq!(broker.submits.len(), 3);
        let replacement = &broker.submits[2];
        assert_eq!(replacement.lots, Lots::new(dec!(2)));
        assert_eq!(replacement.limit_price, old_price);

        // The side now tracks the replacement.
        let new = mgr.resting(QuoteSide::Bid).unwrap();
        assert_ne!(new, r);
        assert_eq!(mgr.store().get(new).unwrap().state, TradeState::Pending);
    }

    #[test]
    fn test_partial_cancel_clamped_to_fills() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::Amend);
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        mgr.on_broker_fact(
            &BrokerFact::Fill {
                broker_id: 1,
                cumulative_lots: Lots::new(dec!(3)),
                price: Price::new(dec!(1.09970)),
            },
            2_000,
        );

        mgr.manual_cancel(r, Some(Lots::new(dec!(1))), &mut broker)
            .unwrap();
        assert_eq!(broker.cancels, vec![(1, Some(Lots::new(dec!(3))))]);
    }

    #[test]
    fn test_replace_style_clamped_to_fills_skips_resubmission() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::CancelReplace);
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        mgr.on_broker_fact(
            &BrokerFact::Fill {
                broker_id: 1,
                cumulative_lots: Lots::new(dec!(3)),
                price: Price::new(dec!(1.09970)),
            },
            2_000,
        );

        // Keep clamps up to the 3 filled lots, leaving no remainder:
        // the full cancel stands alone, no zero-lot replacement.
        mgr.manual_cancel(r, Some(Lots::new(dec!(1))), &mut broker)
            .unwrap();
        assert_eq!(broker.cancels, vec![(1, None)]);
        assert_eq!(broker.submits.len(), 2);
        assert_eq!(mgr.resting(QuoteSide::Bid), Some(r));
        assert_eq!(
            mgr.store().get(r).unwrap().state,
            TradeState::CancelRequested
        );
    }

    #[test]
    fn test_partial_cancel_at_target_is_noop() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::Amend);
        let r = mgr.resting(QuoteSide::Bid).unwrap();

        mgr.manual_cancel(r, Some(Lots::new(dec!(5))), &mut broker)
            .unwrap();
        assert!(broker.cancels.is_empty());
    }

    #[test]
    fn test_close_requires_open_state() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());
        let r = mgr.resting(QuoteSide::Bid).unwrap();

        let err = mgr.manual_close(r, &mut broker).unwrap_err();
        assert!(matches!(err, EngineError::NotOpen { .. }));
    }

    #[test]
    fn test_close_requires_position_link() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        mgr.on_broker_fact(
            &BrokerFact::Fill {
                broker_id: 1,
                cumulative_lots: Lots::new(dec!(5)),
                price: Price::new(dec!(1.09970)),
            },
            2_000,
        );

        let err = mgr.manual_close(r, &mut broker).unwrap_err();
        assert!(matches!(err, EngineError::NoPositionLink { broker_id: 1 }));

        broker.position_link = Some(900);
        mgr.manual_close(r, &mut broker).unwrap();
        assert_eq!(broker.closes, vec![(900, Lots::new(dec!(5)))]);
    }

    #[test]
    fn test_cancel_all_hits_every_resting_order() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());

        assert_eq!(mgr.manual_cancel_all(&mut broker), 2);
        assert_eq!(broker.cancels, vec![(1, None), (2, None)]);

        // Already-requested cancels are not re-issued.
        assert_eq!(mgr.manual_cancel_all(&mut broker), 0);
    }

    #[test]
    fn test_stale_ref_rejected() {
        let (mut mgr, mut broker) = quoted_manager(CancelStyle::default());
        let r = mgr.resting(QuoteSide::Bid).unwrap();
        mgr.on_broker_fact(&BrokerFact::CancelConfirmed { broker_id: 1 }, 2_000);
        mgr.sweep();

        let err = mgr.manual_cancel(r, None, &mut broker).unwrap_err();
        assert!(matches!(err, EngineError::UnknownOrder));
    }
}
