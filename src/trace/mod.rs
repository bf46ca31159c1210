//! Span tracing for instrumented calls.
//!
//! A [`Tracer`] starts one [`ActiveSpan`] per tracking operation. The
//! default [`TracingTracer`] emits spans through the `tracing` crate, so any
//! subscriber (fmt, OpenTelemetry, ...) installed by the host sees them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tracing_subscriber::prelude::*;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .init();
//!
//! // Every traced driver call now shows up as a `db.call` span:
//! // db.call{otel.name="Connection.execute" db.method="execute"}
//! let rows = traced_conn.execute("UPDATE t SET x = 1", &[])?;
//! ```

mod span;
mod tracer;

pub use span::{SpanStatus, SpanValue, attribute_keys};
pub use tracer::{ActiveSpan, Tracer, TracingTracer};
