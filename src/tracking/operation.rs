//! The tracking operation state machine.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use super::instrumenter::Instrumenter;
use crate::clock::nanos_to_millis;
use crate::stats::{Measure, MeasureValue, TagKey, TagValue, record_stat_with_tags};
use crate::trace::{ActiveSpan, SpanStatus, SpanValue, attribute_keys};

/// The phase of a driver call a size sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Sending a statement or its parameters.
    Execute,
    /// Reading result rows.
    Fetch,
}

impl Phase {
    /// Returns the `phase` tag value.
    pub fn tag_value(self) -> TagValue {
        match self {
            Phase::Execute => TagValue::from_static("execute"),
            Phase::Fetch => TagValue::from_static("fetch"),
        }
    }
}

/// Measures one wrapped call.
///
/// Created before the delegate runs, it owns one active span until
/// [`close`](Self::close). `close` is idempotent and also runs on drop, so
/// the span is released exactly once on every exit path.
///
/// No method returns an error: a failure inside the stats backend is logged
/// and the sample is lost.
///
/// The method is tagged in its sanitized form (see [`TagValue::sanitized`]);
/// the span's `db.method` attribute keeps the raw string.
///
/// An operation dropped while its thread unwinds records the error
/// `panicked`, unless the thread was already unwinding when the operation
/// was created, as happens for operations run inside a destructor.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use dbcensus::{Instrumenter, stats::InMemoryStats};
///
/// let stats = InMemoryStats::new();
/// let instrumenter = Instrumenter::builder().recorder(Arc::new(stats.clone())).build()?;
///
/// let mut op = instrumenter.start("Connection.execute", "execute");
/// op.record_exception("MockError: boom");
/// op.close();
///
/// let errors = stats.samples_for(instrumenter.registry().measures().errors.name());
/// assert_eq!(errors[0].tag("reason"), Some("MockError: boom"));
/// # Ok::<(), dbcensus::Error>(())
/// ```
pub struct TrackingOperation {
    instrumenter: Instrumenter,
    name: Cow<'static, str>,
    method: Cow<'static, str>,
    method_tag: TagValue,
    start_nanos: u64,
    span: Box<dyn ActiveSpan>,
    failed: bool,
    closed: bool,
    created_unwinding: bool,
}

impl TrackingOperation {
    /// Starts tracking a call: reads the clock and opens a span named
    /// `span_name` under the current span.
    pub fn create(
        instrumenter: &Instrumenter,
        span_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        let name = span_name.into();
        let method: Cow<'static, str> = method.into();
        let method_tag = TagValue::sanitized(&method);
        let start_nanos = instrumenter.clock().now_nanos();
        let mut span = instrumenter.tracer().start_span(&name);
        span.set_attribute(attribute_keys::DB_METHOD, SpanValue::from(method.as_ref()));

        Self {
            instrumenter: instrumenter.clone(),
            name,
            method,
            method_tag,
            start_nanos,
            span,
            failed: false,
            closed: false,
            created_unwinding: std::thread::panicking(),
        }
    }

    /// Returns the span name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the method name as given to [`create`](Self::create).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns `true` if an error was recorded.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Returns the time elapsed since creation on the instrumenter's clock.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos())
    }

    fn elapsed_nanos(&self) -> u64 {
        self.instrumenter.clock().now_nanos().saturating_sub(self.start_nanos)
    }

    /// Returns the `tracing` span backing this operation, if any.
    pub fn tracing_span(&self) -> Option<tracing::Span> {
        self.span.tracing_span()
    }

    /// Attaches an attribute to the span. Ignored once closed.
    pub fn set_attribute(&mut self, key: &'static str, value: impl Into<SpanValue>) {
        if !self.closed {
            self.span.set_attribute(key, value.into());
        }
    }

    /// Records the error raised by the wrapped call.
    ///
    /// Sets the span status to error with the error's display string as the
    /// description and counts one error tagged `{reason, method}`. Only the
    /// first call on an open operation has any effect.
    pub fn record_exception<E>(&mut self, err: &E)
    where
        E: fmt::Display + ?Sized,
    {
        if self.closed {
            tracing::debug!(span = %self.name, "ignoring error recorded after close");
            return;
        }
        if self.failed {
            tracing::debug!(span = %self.name, "ignoring second recorded error");
            return;
        }
        self.failed = true;

        let description = err.to_string();
        let reason = TagValue::sanitized(&description);
        self.span.set_status(SpanStatus::Error(description));

        let measure = &self.instrumenter.registry().measures().errors;
        self.record(measure, MeasureValue::Int(1), vec![
            (TagKey::REASON, reason),
            (TagKey::METHOD, self.method_tag.clone()),
        ]);
    }

    /// Records the length of statement text sent by this call.
    ///
    /// Skipped when size recording is disabled.
    pub fn record_key_length(&self, len: usize, statement_type: &'static str, phase: Phase) {
        let measure = &self.instrumenter.registry().measures().key_length;
        self.record_size(measure, len, statement_type, phase);
    }

    /// Records the length of a value bound or read by this call.
    ///
    /// Skipped when size recording is disabled.
    pub fn record_value_length(&self, len: usize, statement_type: &'static str, phase: Phase) {
        let measure = &self.instrumenter.registry().measures().value_length;
        self.record_size(measure, len, statement_type, phase);
    }

    fn record_size(&self, measure: &Measure, len: usize, statement_type: &'static str, phase: Phase) {
        if self.closed || !self.instrumenter.config().record_sizes {
            return;
        }
        self.record(measure, MeasureValue::from(len), vec![
            (TagKey::METHOD, self.method_tag.clone()),
            (TagKey::TYPE, TagValue::from_static(statement_type)),
            (TagKey::PHASE, phase.tag_value()),
        ]);
    }

    /// Ends the operation.
    ///
    /// The first call records the latency in fractional milliseconds tagged
    /// `{method}`, counts the call tagged `{method, status}` and ends the
    /// span. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let latency_ms = nanos_to_millis(self.elapsed_nanos());
        let measures = self.instrumenter.registry().measures();
        self.record(&measures.latency_ms, MeasureValue::Float(latency_ms), vec![(
            TagKey::METHOD,
            self.method_tag.clone(),
        )]);

        let status = if self.failed { TagValue::ERROR } else { TagValue::OK };
        self.record(&measures.calls, MeasureValue::Int(1), vec![
            (TagKey::METHOD, self.method_tag.clone()),
            (TagKey::STATUS, status),
        ]);

        if !self.failed {
            self.span.set_status(SpanStatus::Ok);
        }
        self.span.end();
    }

    fn record(&self, measure: &Measure, value: MeasureValue, pairs: Vec<(TagKey, TagValue)>) {
        let recorder = self.instrumenter.recorder();
        if let Err(err) = record_stat_with_tags(recorder, measure, value, pairs) {
            if self.instrumenter.config().log_backend_failures {
                tracing::warn!(
                    measure = measure.name(),
                    method = %self.method_tag,
                    error = %err,
                    "failed to record measurement"
                );
            } else {
                tracing::debug!(measure = measure.name(), error = %err, "measurement dropped");
            }
        }
    }
}

impl Drop for TrackingOperation {
    fn drop(&mut self) {
        if !self.closed && !self.created_unwinding && std::thread::panicking() {
            self.record_exception("panicked");
        }
        self.close();
    }
}

impl fmt::Debug for TrackingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingOperation")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("created_unwinding", &self.created_unwinding)
            .field("start_nanos", &self.start_nanos)
            .field("failed", &self.failed)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
