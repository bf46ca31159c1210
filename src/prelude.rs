//! Prelude module for convenient imports.
//!
//! ```rust
//! use dbcensus::prelude::*;
//! ```
//!
//! This provides access to:
//! - The instrumenter and tracking operation
//! - Configuration and error types
//! - The in-memory stats backend and registry
//! - Driver traits and traced wrappers

pub use crate::{
    config::InstrumentationConfig,
    driver::{Connection, Row, Rows, Statement, Value},
    error::{Error, ErrorKind, Result},
    stats::{InMemoryStats, Registry, StatsRecorder, TagContext, TagKey, TagValue, ViewManager},
    trace::{SpanStatus, Tracer, TracingTracer},
    traced::{TracedConnection, TracedRows, TracedStatement},
    tracking::{Instrumenter, Phase, TrackingOperation},
};
