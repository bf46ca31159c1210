//! # dbcensus
//!
//! Metrics and trace instrumentation for SQL database drivers.
//!
//! Every call on a wrapped connection, statement or cursor becomes a
//! tracking operation that opens a span, counts errors, records latency in
//! fractional milliseconds and counts the call, without changing what the
//! driver returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dbcensus::prelude::*;
//! use dbcensus::testing::MockConnection;
//!
//! // Once at startup: build the vocabulary and register its views.
//! let stats = InMemoryStats::new();
//! let instrumenter = Instrumenter::builder()
//!     .recorder(Arc::new(stats.clone()))
//!     .config(InstrumentationConfig::builder().metric_prefix("sql").build())
//!     .build()?;
//! instrumenter.registry().register_all_views(&stats)?;
//!
//! // Wrap any driver connection.
//! let mut conn = TracedConnection::new(MockConnection::new(), instrumenter.clone());
//! conn.execute("DELETE FROM sessions WHERE expired", &[]).unwrap();
//!
//! // Or track an arbitrary call.
//! let pong: std::result::Result<&str, std::io::Error> = instrumenter.instrument("Cache.ping", "ping", || Ok("pong"));
//! assert_eq!(pong.unwrap(), "pong");
//!
//! assert_eq!(stats.snapshot().views["sql/client/calls"].total_count(), 2);
//! # Ok::<(), dbcensus::Error>(())
//! ```
//!
//! ## Key Concepts
//!
//! - **Registry**: tag keys, instruments and views, built once and shared
//! - **Tracking operation**: `create` → optional `record_exception` → `close`
//! - **Errors pass through**: wrapped calls return the driver's own error
//! - **Telemetry never fails a call**: backend errors are logged and dropped
//!
//! ## Features
//!
//! - `metrics`: a stats backend forwarding to the `metrics` crate facade

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod clock;
pub mod config;
pub mod error;
pub mod stats;
pub mod trace;
pub mod tracking;

// Driver seam and wrappers
pub mod driver;
pub mod traced;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use config::InstrumentationConfig;
pub use error::{Error, ErrorKind, Result};
pub use stats::{InMemoryStats, Registry};
pub use tracking::{Instrumenter, InstrumenterBuilder, TrackingOperation};
