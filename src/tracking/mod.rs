//! Per-call tracking of wrapped driver operations.
//!
//! A [`TrackingOperation`] measures one call: it is created before the
//! delegate runs, optionally annotated with the delegate's error, and closed
//! exactly once afterwards. An [`Instrumenter`] owns the shared registry and
//! backends and wraps closures or futures in that lifecycle.
//!
//! ```text
//! OPEN --record_exception(e)--> OPEN    span status set to error, error counted
//! OPEN --close()-------------> CLOSED  latency and call count recorded, span ended
//! CLOSED --close()-----------> CLOSED  no-op
//! CLOSED --record_exception--> CLOSED  ignored
//! ```

mod instrumenter;
mod operation;

pub use instrumenter::{HasRecorder, Instrumenter, InstrumenterBuilder, NoRecorder};
pub use operation::{Phase, TrackingOperation};
