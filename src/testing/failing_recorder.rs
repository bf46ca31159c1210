//! A stats backend that rejects every write.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::stats::{Measure, MeasureValue, StatsRecorder, TagContext, View, ViewManager};

/// Fails every registration and recording with a backend error, counting
/// the attempts.
#[derive(Debug, Clone, Default)]
pub struct FailingRecorder {
    attempts: Arc<AtomicUsize>,
}

impl FailingRecorder {
    /// Creates a failing recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes were attempted.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StatsRecorder for FailingRecorder {
    fn record(&self, measure: &Measure, _value: MeasureValue, _tags: &TagContext) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::backend(format!("exporter unavailable for '{}'", measure.name())))
    }
}

impl ViewManager for FailingRecorder {
    fn register_view(&self, view: &View) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::backend(format!("cannot register view '{}'", view.name())))
    }
}
