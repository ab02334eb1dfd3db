//! Structured logging initialization.

use crate::error::TelemetryResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rq_engine=debug,rq_core=debug"))
}

/// Initialize the global tracing subscriber.
///
/// Emits JSON when `RUST_ENV=production`, human-readable output
/// otherwise. `RUST_LOG` overrides the default filter. Quote-cycle
/// decisions log at debug, broker facts at info, divergence at warn.
pub fn init_logging() -> TelemetryResult<()> {
    let production = std::env::var("RUST_ENV").is_ok_and(|v| v == "production");

    if production {
        tracing_subscriber::registry()
            .with(default_filter())
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(default_filter())
            .with(fmt::layer().pretty().with_target(true))
            .init();
    }

    Ok(())
}

/// Best-effort subscriber for tests; repeated calls are harmless.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().compact().with_test_writer())
        .try_init();
}
