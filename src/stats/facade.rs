//! Stats backend that forwards to the `metrics` crate facade.
//!
//! Bucket boundaries are not forwarded: exporters such as
//! `metrics-exporter-prometheus` configure buckets themselves. Hosts that
//! need dashboard-compatible buckets should pass
//! [`MILLISECONDS_BOUNDARIES`](super::MILLISECONDS_BOUNDARIES) and
//! [`BYTES_BOUNDARIES`](super::BYTES_BOUNDARIES) to their exporter.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{Label, Unit as MetricsUnit};
use parking_lot::RwLock;

use super::measure::{Measure, MeasureValue, Unit};
use super::recorder::StatsRecorder;
use super::tags::TagContext;
use super::view::{Aggregation, View, ViewManager};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instrument {
    Counter,
    Histogram,
}

/// Forwards measurements to the globally installed `metrics` recorder.
///
/// Only instruments with a registered view are forwarded; a count view
/// becomes a counter and a distribution view becomes a histogram.
#[derive(Debug, Clone, Default)]
pub struct MetricsFacade {
    instruments: Arc<RwLock<HashMap<String, (View, Instrument)>>>,
}

impl MetricsFacade {
    /// Creates a facade backend with no views registered.
    pub fn new() -> Self {
        Self::default()
    }
}

fn metrics_unit(unit: Unit) -> MetricsUnit {
    match unit {
        Unit::Dimensionless => MetricsUnit::Count,
        Unit::Milliseconds => MetricsUnit::Milliseconds,
        Unit::Bytes => MetricsUnit::Bytes,
    }
}

fn metric_name(measure: &Measure) -> String {
    measure.name().replace('/', "_")
}

impl ViewManager for MetricsFacade {
    fn register_view(&self, view: &View) -> Result<()> {
        view.validate()?;
        let mut instruments = self.instruments.write();
        if let Some((existing, _)) = instruments.get(view.measure().name()) {
            if existing == view {
                return Ok(());
            }
            return Err(Error::duplicate_view(view.name()));
        }

        let name = metric_name(view.measure());
        let unit = metrics_unit(view.measure().unit());
        let description = view.description().to_string();
        let instrument = match view.aggregation() {
            Aggregation::Count => {
                metrics::describe_counter!(name, unit, description);
                Instrument::Counter
            },
            Aggregation::Distribution(_) => {
                metrics::describe_histogram!(name, unit, description);
                Instrument::Histogram
            },
        };
        instruments.insert(view.measure().name().to_string(), (view.clone(), instrument));
        Ok(())
    }
}

impl StatsRecorder for MetricsFacade {
    fn record(&self, measure: &Measure, value: MeasureValue, tags: &TagContext) -> Result<()> {
        let Some(instrument) = self.instruments.read().get(measure.name()).map(|(_, i)| *i) else {
            return Ok(());
        };

        let labels: Vec<Label> =
            tags.iter().map(|(k, v)| Label::new(k.name().to_string(), v.to_string())).collect();
        let name = metric_name(measure);

        match (instrument, value) {
            (Instrument::Counter, MeasureValue::Int(n)) => {
                let n = u64::try_from(n)
                    .map_err(|_| Error::backend(format!("negative count {n} for '{name}'")))?;
                metrics::counter!(name, labels).increment(n);
            },
            (Instrument::Counter, MeasureValue::Float(f)) => {
                return Err(Error::backend(format!("fractional count {f} for '{name}'")));
            },
            (Instrument::Histogram, value) => {
                metrics::histogram!(name, labels).record(value.as_f64());
            },
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::stats::{Registry, TagKey, TagValue, record_stat_with_tags};

    #[test]
    fn test_metric_name_is_flattened() {
        let registry = Registry::default();
        assert_eq!(metric_name(&registry.measures().latency_ms), "sql_client_latency");
    }

    #[test]
    fn test_records_without_installed_recorder() {
        let registry = Registry::default();
        let facade = MetricsFacade::new();
        registry.register_all_views(&facade).unwrap();

        record_stat_with_tags(&facade, &registry.measures().calls, 1i64, [(
            TagKey::METHOD,
            TagValue::from("execute"),
        )])
        .unwrap();
        record_stat_with_tags(&facade, &registry.measures().latency_ms, 1.5f64, [(
            TagKey::METHOD,
            TagValue::from("execute"),
        )])
        .unwrap();
    }

    #[test]
    fn test_negative_count_is_a_backend_error() {
        let registry = Registry::default();
        let facade = MetricsFacade::new();
        registry.register_all_views(&facade).unwrap();

        let err = facade
            .record(&registry.measures().errors, MeasureValue::Int(-1), &TagContext::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
    }
}
