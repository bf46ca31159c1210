//! Testing utilities for instrumented code.
//!
//! - [`RecordingTracer`]: a tracer that keeps every span for assertions
//! - [`MockConnection`]: a scriptable in-process driver
//! - [`FailingRecorder`]: a stats backend whose every write fails
//!
//! Pair them with [`InMemoryStats`](crate::stats::InMemoryStats) to assert
//! on both spans and measurements:
//!
//! ```rust
//! use std::sync::Arc;
//! use dbcensus::driver::Connection;
//! use dbcensus::stats::InMemoryStats;
//! use dbcensus::testing::{MockConnection, RecordingTracer};
//! use dbcensus::{Instrumenter, traced::TracedConnection};
//!
//! let stats = InMemoryStats::new();
//! let tracer = RecordingTracer::new();
//! let instrumenter = Instrumenter::builder()
//!     .recorder(Arc::new(stats.clone()))
//!     .tracer(Arc::new(tracer.clone()))
//!     .build()?;
//!
//! let mut conn = TracedConnection::new(MockConnection::new().fail_on("commit", "deadlock"), instrumenter);
//! let err = conn.commit().unwrap_err();
//! assert_eq!(err.to_string(), "MockError: deadlock");
//!
//! let span = tracer.span("Connection.commit").unwrap();
//! assert_eq!(span.status.error_message(), Some("MockError: deadlock"));
//! # Ok::<(), dbcensus::Error>(())
//! ```

mod failing_recorder;
mod mock_driver;
mod recording_tracer;

pub use failing_recorder::FailingRecorder;
pub use mock_driver::{MockConnection, MockError, MockRows, MockStatement};
pub use recording_tracer::{RecordingTracer, SpanRecord};
