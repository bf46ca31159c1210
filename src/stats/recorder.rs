//! Recording measurements against the stats backend.

use std::fmt;

use super::measure::{Measure, MeasureValue};
use super::tags::{TagContext, TagKey, TagValue};
use crate::error::Result;

/// Backend-side sink for measurements.
///
/// Implementations must be safe to call from many threads at once. A
/// returned error is treated as a lost sample by the instrumentation layer.
pub trait StatsRecorder: Send + Sync + fmt::Debug {
    /// Records one sample of `measure` under `tags`.
    fn record(&self, measure: &Measure, value: MeasureValue, tags: &TagContext) -> Result<()>;
}

/// Records one sample within a tag scope built from the ambient context
/// plus `pairs`.
///
/// The scope is released on every exit path, including a recorder error or
/// a panic inside the recorder.
///
/// ```rust
/// use dbcensus::stats::{InMemoryStats, Measures, TagKey, TagValue, record_stat_with_tags};
///
/// let stats = InMemoryStats::new();
/// let measures = Measures::default();
/// record_stat_with_tags(&stats, &measures.calls, 1i64, [(TagKey::METHOD, TagValue::from("execute"))])
///     .unwrap();
/// assert_eq!(stats.samples_for(measures.calls.name()).len(), 1);
/// ```
pub fn record_stat_with_tags<I>(
    recorder: &dyn StatsRecorder,
    measure: &Measure,
    value: impl Into<MeasureValue>,
    pairs: I,
) -> Result<()>
where
    I: IntoIterator<Item = (TagKey, TagValue)>,
{
    let context = TagContext::current().merged(pairs)?;
    let scope = context.enter();
    recorder.record(measure, value.into(), scope.context())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::stats::Measures;

    #[derive(Debug, Default)]
    struct Capture {
        seen: Mutex<Vec<(String, f64, TagContext, TagContext)>>,
        fail: bool,
    }

    impl StatsRecorder for Capture {
        fn record(&self, measure: &Measure, value: MeasureValue, tags: &TagContext) -> Result<()> {
            self.seen.lock().unwrap().push((
                measure.name().to_string(),
                value.as_f64(),
                tags.clone(),
                TagContext::current(),
            ));
            if self.fail { Err(Error::backend("exporter down")) } else { Ok(()) }
        }
    }

    #[test]
    fn test_records_within_scope() {
        let capture = Capture::default();
        let measures = Measures::default();

        record_stat_with_tags(&capture, &measures.errors, 1i64, [
            (TagKey::METHOD, TagValue::from("execute")),
            (TagKey::REASON, TagValue::from("MockError: boom")),
        ])
        .unwrap();

        let seen = capture.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (name, value, tags, ambient) = &seen[0];
        assert_eq!(name, measures.errors.name());
        assert_eq!(*value, 1.0);
        assert_eq!(tags.get(&TagKey::REASON).map(TagValue::as_str), Some("MockError: boom"));
        assert_eq!(tags, ambient);
        assert!(TagContext::current().is_empty());
    }

    #[test]
    fn test_merges_with_ambient_context() {
        let capture = Capture::default();
        let measures = Measures::default();
        let outer = TagContext::from_pairs([(TagKey::PHASE, TagValue::from("fetch"))]).unwrap();
        let _outer = outer.enter();

        record_stat_with_tags(&capture, &measures.calls, 1i64, [(
            TagKey::METHOD,
            TagValue::from("next"),
        )])
        .unwrap();

        let seen = capture.seen.lock().unwrap();
        let tags = &seen[0].2;
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get(&TagKey::PHASE).map(TagValue::as_str), Some("fetch"));
        assert_eq!(TagContext::current().len(), 1);
    }

    #[test]
    fn test_scope_released_on_recorder_error() {
        let capture = Capture { fail: true, ..Default::default() };
        let measures = Measures::default();

        let err = record_stat_with_tags(&capture, &measures.calls, 1i64, [(
            TagKey::METHOD,
            TagValue::from("ping"),
        )])
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(TagContext::current().is_empty());
    }

    #[test]
    fn test_invalid_tag_value_is_rejected_before_recording() {
        let capture = Capture::default();
        let measures = Measures::default();

        let err = record_stat_with_tags(&capture, &measures.calls, 1i64, [(
            TagKey::REASON,
            TagValue::from("two\nlines"),
        )])
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TagScope);
        assert!(capture.seen.lock().unwrap().is_empty());
    }
}
