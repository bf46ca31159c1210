//! Integration tests for dbcensus.
//!
//! These tests wrap the in-process mock driver and assert on the spans and
//! measurements produced through the public API only.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With log output
//! RUST_LOG=dbcensus=debug cargo test --test integration -- --nocapture
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod async_tests;
mod common;
mod registry_tests;
mod traced_driver_tests;
mod tracking_tests;
