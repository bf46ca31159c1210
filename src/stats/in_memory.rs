//! In-process stats backend.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use super::buckets::bucket_index;
use super::measure::{Measure, MeasureValue};
use super::recorder::StatsRecorder;
use super::tags::{TagContext, TagValue};
use super::view::{Aggregation, View, ViewManager};
use crate::error::{Error, Result};

/// A stats backend that aggregates in memory.
///
/// Implements both [`ViewManager`] and [`StatsRecorder`]. Every sample is
/// folded into each registered view over its measure, partitioned by the
/// view's tag columns. The most recent raw samples are kept as well, up to
/// [`DEFAULT_SAMPLE_CAPACITY`] by default, so tests can assert on individual
/// recordings. The oldest sample is evicted first; the aggregates are
/// unaffected by eviction.
///
/// Cloning is cheap; clones share state.
///
/// ## Example
///
/// ```rust
/// use dbcensus::stats::{InMemoryStats, Registry};
///
/// let registry = Registry::default();
/// let stats = InMemoryStats::new();
/// registry.register_all_views(&stats).unwrap();
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.views.len(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStats {
    inner: Arc<RwLock<State>>,
}

/// Number of raw samples [`InMemoryStats::new`] retains.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 10_000;

#[derive(Debug)]
struct State {
    views: BTreeMap<String, ViewState>,
    samples: VecDeque<Sample>,
    sample_capacity: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            views: BTreeMap::new(),
            samples: VecDeque::new(),
            sample_capacity: DEFAULT_SAMPLE_CAPACITY,
        }
    }
}

impl State {
    fn push_sample(&mut self, sample: Sample) {
        if self.sample_capacity == 0 {
            return;
        }
        while self.samples.len() >= self.sample_capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
}

#[derive(Debug)]
struct ViewState {
    view: View,
    rows: BTreeMap<Vec<Option<TagValue>>, AggregationData>,
}

/// One recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Name of the instrument.
    pub measure: String,
    /// Recorded value.
    pub value: f64,
    /// Tags in effect when the sample was recorded.
    pub tags: TagContext,
}

impl Sample {
    /// Returns the value of the tag named `key`, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|(k, _)| k.name() == key).map(|(_, v)| v.as_str())
    }
}

/// Aggregated data for one row of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationData {
    /// Count aggregation.
    Count {
        /// Number of samples.
        count: u64,
    },
    /// Distribution aggregation.
    Distribution {
        /// Number of samples.
        count: u64,
        /// Sum of sample values.
        sum: f64,
        /// Smallest sample.
        min: f64,
        /// Largest sample.
        max: f64,
        /// Per-bucket counts; one more entry than there are boundaries.
        bucket_counts: Vec<u64>,
    },
}

impl AggregationData {
    fn empty(aggregation: &Aggregation) -> Self {
        match aggregation {
            Aggregation::Count => AggregationData::Count { count: 0 },
            Aggregation::Distribution(b) => AggregationData::Distribution {
                count: 0,
                sum: 0.0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                bucket_counts: vec![0; b.len() + 1],
            },
        }
    }

    fn add(&mut self, aggregation: &Aggregation, value: f64) {
        match (self, aggregation) {
            (AggregationData::Count { count }, _) => *count += 1,
            (
                AggregationData::Distribution { count, sum, min, max, bucket_counts },
                Aggregation::Distribution(boundaries),
            ) => {
                *count += 1;
                *sum += value;
                *min = min.min(value);
                *max = max.max(value);
                bucket_counts[bucket_index(boundaries, value)] += 1;
            },
            (AggregationData::Distribution { .. }, Aggregation::Count) => {},
        }
    }

    /// Returns the number of samples aggregated.
    pub fn count(&self) -> u64 {
        match self {
            AggregationData::Count { count } | AggregationData::Distribution { count, .. } => {
                *count
            },
        }
    }
}

/// A point-in-time copy of every registered view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    /// Views keyed by name.
    pub views: BTreeMap<String, ViewSnapshot>,
}

/// A point-in-time copy of one view.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    /// Name of the aggregated instrument.
    pub measure: String,
    /// Rows, one per distinct tag tuple seen.
    pub rows: Vec<RowSnapshot>,
}

impl ViewSnapshot {
    /// Returns the total number of samples across all rows.
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.data.count()).sum()
    }
}

/// One row of a view.
#[derive(Debug, Clone, Serialize)]
pub struct RowSnapshot {
    /// Column values; columns without a value are omitted.
    pub tags: BTreeMap<String, String>,
    /// Aggregated data.
    pub data: AggregationData,
}

impl InMemoryStats {
    /// Creates an empty backend with no views registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend retaining at most `capacity` raw samples.
    ///
    /// A capacity of zero disables raw sample capture; views still aggregate.
    pub fn with_sample_capacity(capacity: usize) -> Self {
        let state = State { sample_capacity: capacity, ..State::default() };
        Self { inner: Arc::new(RwLock::new(state)) }
    }

    /// Returns the maximum number of raw samples retained.
    pub fn sample_capacity(&self) -> usize {
        self.inner.read().sample_capacity
    }

    /// Returns the registered views.
    pub fn registered_views(&self) -> Vec<View> {
        self.inner.read().views.values().map(|v| v.view.clone()).collect()
    }

    /// Returns the retained raw samples, oldest first.
    pub fn samples(&self) -> Vec<Sample> {
        self.inner.read().samples.iter().cloned().collect()
    }

    /// Returns the raw samples recorded for the named instrument.
    pub fn samples_for(&self, measure: &str) -> Vec<Sample> {
        self.inner.read().samples.iter().filter(|s| s.measure == measure).cloned().collect()
    }

    /// Returns a snapshot of all views.
    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.inner.read();
        let views = state
            .views
            .iter()
            .map(|(name, vs)| {
                let rows = vs
                    .rows
                    .iter()
                    .map(|(key, data)| RowSnapshot {
                        tags: vs
                            .view
                            .columns()
                            .iter()
                            .zip(key)
                            .filter_map(|(col, value)| {
                                value.as_ref().map(|v| (col.name().to_string(), v.to_string()))
                            })
                            .collect(),
                        data: data.clone(),
                    })
                    .collect();
                (
                    name.clone(),
                    ViewSnapshot { measure: vs.view.measure().name().to_string(), rows },
                )
            })
            .collect();
        StatsSnapshot { views }
    }

    /// Clears recorded data; registrations are kept.
    pub fn reset(&self) {
        let mut state = self.inner.write();
        state.samples.clear();
        for vs in state.views.values_mut() {
            vs.rows.clear();
        }
    }
}

impl ViewManager for InMemoryStats {
    fn register_view(&self, view: &View) -> Result<()> {
        view.validate()?;
        let mut state = self.inner.write();
        if let Some(existing) = state.views.get(view.name()) {
            if existing.view == *view {
                tracing::debug!(view = view.name(), "view already registered");
                return Ok(());
            }
            return Err(Error::duplicate_view(view.name()));
        }
        state
            .views
            .insert(view.name().to_string(), ViewState { view: view.clone(), rows: BTreeMap::new() });
        Ok(())
    }
}

impl StatsRecorder for InMemoryStats {
    fn record(&self, measure: &Measure, value: MeasureValue, tags: &TagContext) -> Result<()> {
        let value = value.as_f64();
        let mut state = self.inner.write();
        state.push_sample(Sample { measure: measure.name().to_string(), value, tags: tags.clone() });

        for ViewState { view, rows } in state.views.values_mut() {
            if view.measure() != measure {
                continue;
            }
            let key: Vec<Option<TagValue>> =
                view.columns().iter().map(|col| tags.get(col).cloned()).collect();
            let aggregation = view.aggregation();
            rows.entry(key)
                .or_insert_with(|| AggregationData::empty(aggregation))
                .add(aggregation, value);
        }
        Ok(())
    }
}

/// Groups samples by a tag, counting how many carry each value.
///
/// Handy for assertions such as "two errors for `execute`".
pub fn count_by_tag(samples: &[Sample], key: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for sample in samples {
        if let Some(value) = sample.tag(key) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
