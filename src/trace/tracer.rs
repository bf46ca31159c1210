//! Span-tracing backends.

use std::fmt;

use tracing::field::Empty;

use super::span::{SpanStatus, SpanValue};

/// A span handle owned by exactly one tracking operation.
///
/// `end` is called exactly once by the owner; implementations do not need
/// to guard against a second call.
pub trait ActiveSpan: Send {
    /// Sets the span status.
    fn set_status(&mut self, status: SpanStatus);

    /// Attaches an attribute to the span.
    fn set_attribute(&mut self, key: &'static str, value: SpanValue);

    /// Ends the span, releasing it.
    fn end(&mut self);

    /// Returns the `tracing` span to enter while the wrapped call runs, if
    /// this backend is built on `tracing`.
    fn tracing_span(&self) -> Option<tracing::Span> {
        None
    }
}

/// Starts spans for tracking operations.
///
/// Parentage is the backend's concern: a new span is a child of whatever
/// span is current on the calling context.
pub trait Tracer: Send + Sync + fmt::Debug {
    /// Begins a span named `name`.
    fn start_span(&self, name: &str) -> Box<dyn ActiveSpan>;
}

/// A [`Tracer`] that emits spans through the `tracing` crate.
///
/// `tracing` span names are static, so every span is named `db.call` and
/// carries the operation name in the `otel.name` field, which
/// OpenTelemetry layers use as the exported span name.
///
/// ## Fields
///
/// | Field                    | Set when                      |
/// |--------------------------|-------------------------------|
/// | `otel.name`              | always                        |
/// | `otel.kind`              | always (`client`)             |
/// | `db.system`              | always (`sql`)                |
/// | `otel.status_code`       | status set                    |
/// | `otel.status_description`| error status set              |
/// | `db.method`, `db.operation`, `db.statement`, `db.rows_affected` | attribute set |
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl TracingTracer {
    /// Creates a tracer backed by `tracing`.
    pub fn new() -> Self {
        Self
    }
}

impl Tracer for TracingTracer {
    fn start_span(&self, name: &str) -> Box<dyn ActiveSpan> {
        let span = tracing::info_span!(
            target: "dbcensus",
            "db.call",
            otel.name = name,
            otel.kind = "client",
            otel.status_code = Empty,
            otel.status_description = Empty,
            db.system = "sql",
            db.method = Empty,
            db.operation = Empty,
            db.statement = Empty,
            db.rows_affected = Empty,
        );
        Box::new(TracingSpan { span })
    }
}

struct TracingSpan {
    span: tracing::Span,
}

impl ActiveSpan for TracingSpan {
    fn set_status(&mut self, status: SpanStatus) {
        self.span.record("otel.status_code", status.otel_code());
        if let Some(description) = status.error_message() {
            self.span.record("otel.status_description", description);
        }
    }

    fn set_attribute(&mut self, key: &'static str, value: SpanValue) {
        match value {
            SpanValue::String(s) => self.span.record(key, s.as_str()),
            SpanValue::Int(i) => self.span.record(key, i),
            SpanValue::Float(f) => self.span.record(key, f),
            SpanValue::Bool(b) => self.span.record(key, b),
        };
    }

    fn end(&mut self) {
        // Dropping the last handle closes the span in the subscriber.
        drop(std::mem::replace(&mut self.span, tracing::Span::none()));
    }

    fn tracing_span(&self) -> Option<tracing::Span> {
        Some(self.span.clone())
    }
}

impl fmt::Debug for TracingSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingSpan").field("id", &self.span.id()).finish()
    }
}
