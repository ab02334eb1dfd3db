//! Quote lifecycle engine.
//!
//! Ties the per-cycle pieces together:
//! - `targets`: fresh quote prices from the top-of-book
//! - `store`: exclusive owner of trade records, handed out as handles
//! - `broker`: the gateway trait and the confirmed-fact event type
//! - `manager`: per-side quoting decisions and cancel/replace
//! - `reconcile`: idempotent application of broker facts
//! - `manual`: operator cancel/close commands
//!
//! The engine is synchronous and single-threaded by design: one
//! instrument, one cycle at a time, with all asynchrony pushed behind
//! the fact boundary.

pub mod broker;
pub mod config;
pub mod error;
pub mod manager;
pub mod manual;
pub mod reconcile;
pub mod store;
pub mod targets;

pub use broker::{BrokerFact, BrokerGateway, OrderRequest};
pub use config::{CancelStyle, QuoterConfig};
pub use error::{EngineError, EngineResult};
pub use manager::{FillListener, NoopListener, QuoteManager};
pub use store::{EntityStore, TradeRef};
pub use targets::{compute_targets, QuoteTargets};
