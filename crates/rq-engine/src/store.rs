//! Entity store for order/trade records.
//!
//! The store exclusively owns every `Trade`. Collaborators hold
//! `TradeRef` handles: generational indices that go stale the moment
//! a slot is retired, so a reference held across an asynchronous
//! invalidation can never resolve to a recycled record.

use rq_core::Trade;
use tracing::trace;

/// Stable non-owning handle into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradeRef {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    trade: Option<Trade>,
}

/// Arena of trade records with generational handles.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trade and return its handle.
    pub fn insert(&mut self, trade: Trade) -> TradeRef {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.trade = Some(trade);
            TradeRef {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                trade: Some(trade),
            });
            TradeRef {
                index,
                generation: 0,
            }
        }
    }

    /// Resolve a handle. Returns `None` for stale generations.
    pub fn get(&self, r: TradeRef) -> Option<&Trade> {
        let slot = self.slots.get(r.index as usize)?;
        if slot.generation != r.generation {
            return None;
        }
        slot.trade.as_ref()
    }

    /// Resolve a handle mutably. Returns `None` for stale generations.
    pub fn get_mut(&mut self, r: TradeRef) -> Option<&mut Trade> {
        let slot = self.slots.get_mut(r.index as usize)?;
        if slot.generation != r.generation {
            return None;
        }
        slot.trade.as_mut()
    }

    /// Retire a record: bump the slot generation so outstanding handles
    /// go stale, recycle the slot, and hand the record back.
    pub fn retire(&mut self, r: TradeRef) -> Option<Trade> {
        let slot = self.slots.get_mut(r.index as usize)?;
        if slot.generation != r.generation {
            return None;
        }
        let trade = slot.trade.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(r.index);
        trace!(tag = %trade.tag, state = %trade.state, "Trade retired from store");
        Some(trade)
    }

    /// Find the handle for a broker-assigned identifier.
    pub fn find_by_broker_id(&self, broker_id: u64) -> Option<TradeRef> {
        self.iter().find_map(|(r, t)| {
            if t.broker_id == Some(broker_id) {
                Some(r)
            } else {
                None
            }
        })
    }

    /// Iterate over live records with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (TradeRef, &Trade)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.trade.as_ref().map(|t| {
                (
                    TradeRef {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    t,
                )
            })
        })
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.trade.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
