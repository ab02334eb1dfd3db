//! Quote lifecycle manager.
//!
//! Drives one instrument's two resting quotes from the per-cycle
//! top-of-book. Each side is managed independently: a submit failure
//! or broker error on one side never suppresses the other. The
//! manager holds local intent only; confirmed truth flows in through
//! [`crate::reconcile`] via [`QuoteManager::on_broker_fact`].
//!
//! Cancel/replace is deliberately non-atomic. The replacement is
//! submitted as soon as the cancel command is issued, without waiting
//! for confirmation, so for a short window both the old and the new
//! order may rest at the broker. Reconciliation settles the old entity
//! when its cancel (or a racing fill) confirms.

use crate::broker::{BrokerFact, BrokerGateway, OrderRequest};
use crate::config::QuoterConfig;
use crate::reconcile;
use crate::store::{EntityStore, TradeRef};
use crate::targets::{compute_targets, QuoteTargets};
use rq_core::{CoreError, Instrument, Lots, Price, QuoteSide, TopOfBook, Trade, TradeState};
use tracing::{debug, info, warn};

/// Observer hook for trade lifecycle events. All methods default to
/// no-ops; implementations carry no quoting side effects.
pub trait FillListener {
    /// A broker-confirmed change was applied to a tracked trade.
    fn on_trade_update(&mut self, _trade: &Trade) {}

    /// A submission produced no addressable order.
    fn on_missed(&mut self, _trade: &Trade) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default)]
pub struct NoopListener;

impl FillListener for NoopListener {}

/// Per-side quoting bookkeeping.
///
/// `latched` is set whenever a submission was attempted and blocks
/// fresh quotes until the attempt resolves. A missed submission keeps
/// the latch set; only [`QuoteManager::release_side`] re-arms the side.
#[derive(Debug, Clone, Copy, Default)]
struct SideState {
    resting: Option<TradeRef>,
    latched: bool,
}

/// Lifecycle manager for one instrument's bid and ask quotes.
pub struct QuoteManager {
    config: QuoterConfig,
    instrument: Instrument,
    store: EntityStore,
    bid: SideState,
    ask: SideState,
    warmup_bars: u32,
    listener: Box<dyn FillListener>,
}

impl QuoteManager {
    pub fn new(config: QuoterConfig) -> Result<Self, CoreError> {
        let instrument = config.instrument()?;
        Ok(Self {
            config,
            instrument,
            store: EntityStore::new(),
            bid: SideState::default(),
            ask: SideState::default(),
            warmup_bars: 0,
            listener: Box::new(NoopListener),
        })
    }

    pub fn with_listener(mut self, listener: Box<dyn FillListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Suppress quoting for the next `bars` completed bars.
    pub fn set_warmup(&mut self, bars: u32) {
        self.warmup_bars = bars;
    }

    /// A bar completed; counts down the warmup window.
    pub fn on_bar(&mut self) {
        if self.warmup_bars > 0 {
            self.warmup_bars -= 1;
            debug!(remaining = self.warmup_bars, "Warmup bar elapsed");
        }
    }

    /// Re-arm a side whose latch is held by an unresolved attempt
    /// (typically a missed submission). Operator action; there is no
    /// automatic retry.
    pub fn release_side(&mut self, side: QuoteSide) {
        let s = self.side_mut(side);
        s.latched = false;
        s.resting = None;
        info!(%side, "Side released for quoting");
    }

    /// Run one quoting cycle against a fresh top-of-book.
    pub fn on_tick(&mut self, book: &TopOfBook, now_ms: u64, broker: &mut dyn BrokerGateway) {
        if self.warmup_bars > 0 {
            debug!(remaining = self.warmup_bars, "Quoting suppressed during warmup");
            return;
        }
        if !book.is_valid() {
            debug!(bid = %book.bid, ask = %book.ask, "Book not quotable; cycle skipped");
            return;
        }

        let targets = compute_targets(
            book,
            self.config.depth_pips,
            self.config.pip,
            self.instrument.tick_grid,
        );
        debug!(bid = %targets.bid, ask = %targets.ask, "Targets computed");

        self.tick_side(QuoteSide::Bid, targets.bid, now_ms, broker);
        self.tick_side(QuoteSide::Ask, targets.ask, now_ms, broker);
    }

    /// Apply a broker-confirmed fact, then refresh side bookkeeping
    /// and notify the listener for every touched entity.
    pub fn on_broker_fact(&mut self, fact: &BrokerFact, now_ms: u64) {
        let touched = reconcile::apply_fact(&mut self.store, fact, now_ms);
        for r in touched {
            let Self {
                store, listener, ..
            } = self;
            if let Some(t) = store.get(r) {
                debug!(tag = %t.tag, class = %t.classification(), "Trade updated");
                listener.on_trade_update(t);
            }
        }
        self.sync_side(QuoteSide::Bid);
        self.sync_side(QuoteSide::Ask);
    }

    /// Poll the broker's net position and run the snapshot comparison
    /// against local state.
    pub fn check_position(&mut self, broker: &dyn BrokerGateway, now_ms: u64) {
        let lots = broker.position(&self.instrument.symbol);
        let fact = BrokerFact::PositionSnapshot {
            symbol: self.instrument.symbol.clone(),
            lots,
        };
        self.on_broker_fact(&fact, now_ms);
    }

    /// Retire every terminal record from the store. Returns the count.
    pub fn sweep(&mut self) -> usize {
        let terminal: Vec<TradeRef> = self
            .store
            .iter()
            .filter(|(_, t)| t.state.is_terminal())
            .map(|(r, _)| r)
            .collect();
        let count = terminal.len();
        for r in terminal {
            self.store.retire(r);
        }
        count
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Handle of the resting quote on a side, if one rests.
    pub fn resting(&self, side: QuoteSide) -> Option<TradeRef> {
        self.side(side).resting
    }

    /// Whether a side's latch blocks fresh quotes.
    pub fn is_latched(&self, side: QuoteSide) -> bool {
        self.side(side).latched
    }

    fn tick_side(
        &mut self,
        side: QuoteSide,
        target: Price,
        now_ms: u64,
        broker: &mut dyn BrokerGateway,
    ) {
        self.sync_side(side);
        let state = self.side(side);

        if !state.latched {
            self.submit_quote(side, target, now_ms, broker);
            return;
        }

        let Some(r) = state.resting else {
            // Latch held with nothing resting: an unresolved attempt
            // (missed submission). Stay dormant.
            return;
        };

        let Some((broker_id, quoted)) = self
            .store
            .get(r)
            .and_then(|t| t.broker_id.map(|id| (id, t.limit_price)))
        else {
            return;
        };

        let drift = QuoteTargets::drift(target, quoted);
        if drift <= self.config.tolerance() {
            debug!(%side, %quoted, %target, %drift, "Quote within tolerance");
            return;
        }

        info!(%side, %quoted, %target, %drift, "Quote drifted; replacing");
        if broker.cancel(broker_id, None) {
            if let Some(t) = self.store.get_mut(r) {
                t.state = TradeState::CancelRequested;
                t.updated_at = now_ms;
            }
        } else {
            // The old order may still rest; reconciliation or a mass
            // status pass settles it. The replacement goes out anyway.
            warn!(%side, broker_id, "Cancel command not accepted");
        }
        self.submit_quote(side, target, now_ms, broker);
    }

    fn submit_quote(
        &mut self,
        side: QuoteSide,
        target: Price,
        now_ms: u64,
        broker: &mut dyn BrokerGateway,
    ) {
        let lots = Lots::new(self.config.lots);
        let mut trade = Trade::new(side.direction(), lots, target, now_ms);
        let request = OrderRequest {
            tag: trade.tag.clone(),
            symbol: self.instrument.symbol.clone(),
            direction: trade.direction,
            lots,
            limit_price: target,
        };

        match broker.submit(&request) {
            Some(id) => {
                trade.broker_id = Some(id);
                trade.state = TradeState::Pending;
                info!(%side, tag = %trade.tag, broker_id = id, price = %target, %lots, "Quote resting");
                let r = self.store.insert(trade);
                let s = self.side_mut(side);
                s.resting = Some(r);
                s.latched = true;
            }
            None => {
                trade.state = TradeState::Missed;
                warn!(%side, tag = %trade.tag, price = %target, "Submission missed; side dormant until released");
                let r = self.store.insert(trade);
                let Self {
                    store, listener, ..
                } = self;
                if let Some(t) = store.get(r) {
                    listener.on_missed(t);
                }
                let s = self.side_mut(side);
                s.resting = None;
                s.latched = true;
            }
        }
    }

    /// Drop the resting reference and release the latch once the
    /// tracked entity no longer rests: filled through, terminalized,
    /// or its remainder cancelled away.
    fn sync_side(&mut self, side: QuoteSide) {
        let state = self.side(side);
        let Some(r) = state.resting else {
            return;
        };
        let still_resting = self
            .store
            .get(r)
            .is_some_and(|t| t.state.is_resting() && !t.remaining_lots().is_zero());
        if !still_resting {
            let s = self.side_mut(side);
            s.resting = None;
            s.latched = false;
            debug!(%side, "Resting reference cleared");
        }
    }

    fn side(&self, side: QuoteSide) -> SideState {
        match side {
            QuoteSide::Bid => self.bid,
            QuoteSide::Ask => self.ask,
        }
    }

    fn side_mut(&mut self, side: QuoteSide) -> &mut SideState {
        match side {
            QuoteSide::Bid => &mut self.bid,
            QuoteSide::Ask => &mut self.ask,
        }
    }

    pub(crate) fn config(&self) -> &QuoterConfig {
        &self.config
    }

    pub(crate) fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub(crate) fn relink_resting(&mut self, old: TradeRef, new: TradeRef) {
        if self.bid.resting == Some(old) {
            self.bid.resting = Some(new);
        } else if self.ask.resting == Some(old) {
            self.ask.resting = Some(new);
        }
    }
}
