//! Logging setup for the resting-quote engine.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_test_logging};
