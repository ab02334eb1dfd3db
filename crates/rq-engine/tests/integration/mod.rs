//! Integration tests for rq-engine.
//!
//! These tests drive the full loop: quoting cycles against a scripted
//! gateway, with the gateway's confirmations fed back through the
//! reconciliation path.

pub mod common;
