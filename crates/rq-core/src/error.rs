//! Error types for rq-core.
//!
//! Fatal conditions are limited to configuration errors detected at
//! startup; everything that happens after bring-up is reported through
//! broker facts and logging, never through these variants.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid tick grid: {0} (must be > 0)")]
    InvalidTickGrid(String),

    #[error("Invalid pip size: {0} (must be > 0)")]
    InvalidPip(String),

    #[error("Invalid tolerance: {0} (must be >= 0)")]
    InvalidTolerance(String),

    #[error("Invalid depth offset: {0} (must be >= 0)")]
    InvalidDepth(String),

    #[error("Invalid lot size: {0} (must be > 0)")]
    InvalidLots(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
