//! Scripted broker gateway for integration tests.
//!
//! Records every command, hands out sequential identifiers, and
//! queues the confirmations a real broker would push back. Tests
//! drain the queue and feed it through the manager to close the loop.

use rq_core::{Lots, Price, Symbol};
use rq_engine::{BrokerFact, BrokerGateway, OrderRequest};
use std::collections::{HashMap, VecDeque};

pub struct ScriptedGateway {
    next_id: u64,
    pub accept_submits: bool,
    pub accept_cancels: bool,
    pub submits: Vec<OrderRequest>,
    pub cancels: Vec<(u64, Option<Lots>)>,
    pub closes: Vec<(u64, Lots)>,
    facts: VecDeque<BrokerFact>,
    links: HashMap<u64, u64>,
    net_position: Lots,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            accept_submits: true,
            accept_cancels: true,
            submits: Vec::new(),
            cancels: Vec::new(),
            closes: Vec::new(),
            facts: VecDeque::new(),
            links: HashMap::new(),
            net_position: Lots::ZERO,
        }
    }

    /// Queue a cumulative fill report for an order.
    pub fn push_fill(&mut self, broker_id: u64, cumulative_lots: Lots, price: Price) {
        self.facts.push_back(BrokerFact::Fill {
            broker_id,
            cumulative_lots,
            price,
        });
    }

    pub fn push_fact(&mut self, fact: BrokerFact) {
        self.facts.push_back(fact);
    }

    /// Establish an order-to-position link, as the broker does once an
    /// order fills into a position.
    pub fn link_position(&mut self, broker_id: u64, position_id: u64) {
        self.links.insert(broker_id, position_id);
    }

    pub fn set_position(&mut self, lots: Lots) {
        self.net_position = lots;
    }

    /// Take all queued confirmations, oldest first.
    pub fn drain_facts(&mut self) -> Vec<BrokerFact> {
        self.facts.drain(..).collect()
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerGateway for ScriptedGateway {
    fn submit(&mut self, request: &OrderRequest) -> Option<u64> {
        self.submits.push(request.clone());
        if !self.accept_submits {
            return None;
        }
        self.next_id += 1;
        Some(self.next_id)
    }

    fn cancel(&mut self, broker_id: u64, keep_lots: Option<Lots>) -> bool {
        self.cancels.push((broker_id, keep_lots));
        if !self.accept_cancels {
            return false;
        }
        // Echo the confirmation a real broker sends once the cancel
        // lands on the book.
        match keep_lots {
            None => self.facts.push_back(BrokerFact::CancelConfirmed { broker_id }),
            Some(target_lots) => self.facts.push_back(BrokerFact::PartialCancel {
                broker_id,
                target_lots,
            }),
        }
        true
    }

    fn close_position(&mut self, position_id: u64, lots: Lots) -> bool {
        self.closes.push((position_id, lots));
        true
    }

    fn position(&self, _symbol: &Symbol) -> Lots {
        self.net_position
    }

    fn order_position_link(&self, broker_id: u64) -> Option<u64> {
        self.links.get(&broker_id).copied()
    }
}
