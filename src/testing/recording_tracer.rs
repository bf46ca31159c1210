//! A tracer that records spans in memory.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::trace::{ActiveSpan, SpanStatus, SpanValue, Tracer};

/// Everything observed about one span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRecord {
    /// Span name.
    pub name: String,
    /// Last status set.
    pub status: SpanStatus,
    /// Attributes in the order they were set.
    pub attributes: Vec<(&'static str, SpanValue)>,
    /// How many times the span was ended.
    pub end_count: usize,
}

impl SpanRecord {
    /// Returns the last value set for `key`.
    pub fn attribute(&self, key: &str) -> Option<&SpanValue> {
        self.attributes.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns `true` once the span has ended.
    pub fn is_ended(&self) -> bool {
        self.end_count > 0
    }
}

/// A [`Tracer`] that keeps every span it starts.
///
/// Clones share the same record list. Spans still open when the list is
/// cleared are detached: later updates through them are discarded.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    log: Arc<Mutex<SpanLog>>,
}

#[derive(Debug, Default)]
struct SpanLog {
    next_id: u64,
    spans: Vec<(u64, SpanRecord)>,
}

impl SpanLog {
    fn get_mut(&mut self, id: u64) -> Option<&mut SpanRecord> {
        let index = self.spans.binary_search_by_key(&id, |(id, _)| *id).ok()?;
        self.spans.get_mut(index).map(|(_, record)| record)
    }
}

impl RecordingTracer {
    /// Creates an empty tracer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all spans in start order.
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.log.lock().spans.iter().map(|(_, record)| record.clone()).collect()
    }

    /// Returns the most recent span named `name`.
    pub fn span(&self, name: &str) -> Option<SpanRecord> {
        self.log.lock().spans.iter().rev().map(|(_, s)| s).find(|s| s.name == name).cloned()
    }

    /// Returns the number of spans that have ended at least once.
    pub fn ended_count(&self) -> usize {
        self.log.lock().spans.iter().filter(|(_, s)| s.is_ended()).count()
    }

    /// Forgets all recorded spans.
    pub fn clear(&self) {
        self.log.lock().spans.clear();
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &str) -> Box<dyn ActiveSpan> {
        let mut log = self.log.lock();
        let id = log.next_id;
        log.next_id += 1;
        log.spans.push((id, SpanRecord {
            name: name.to_string(),
            status: SpanStatus::Unset,
            attributes: Vec::new(),
            end_count: 0,
        }));
        Box::new(RecordingSpan { log: Arc::clone(&self.log), id })
    }
}

struct RecordingSpan {
    log: Arc<Mutex<SpanLog>>,
    id: u64,
}

impl RecordingSpan {
    fn with_record(&self, f: impl FnOnce(&mut SpanRecord)) {
        if let Some(record) = self.log.lock().get_mut(self.id) {
            f(record);
        }
    }
}

impl ActiveSpan for RecordingSpan {
    fn set_status(&mut self, status: SpanStatus) {
        self.with_record(|r| r.status = status);
    }

    fn set_attribute(&mut self, key: &'static str, value: SpanValue) {
        self.with_record(|r| r.attributes.push((key, value)));
    }

    fn end(&mut self) {
        self.with_record(|r| r.end_count += 1);
    }
}
