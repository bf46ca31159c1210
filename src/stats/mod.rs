//! Metrics vocabulary and stats backends.
//!
//! This module defines the fixed instrumentation vocabulary and the seams
//! to the stats backend:
//!
//! - [`TagKeys`]: the dimensions measurements are partitioned by
//! - [`Measures`]: call count, error count, latency and size instruments
//! - [`View`]: an instrument bound to an aggregation and tag columns
//! - [`Registry`]: all of the above, built once and shared
//! - [`ViewManager`] / [`StatsRecorder`]: backend traits
//! - [`InMemoryStats`]: an in-process backend with snapshots
//!
//! ## Metrics
//!
//! | Instrument              | Unit | View aggregation        | Tags recorded         |
//! |-------------------------|------|-------------------------|-----------------------|
//! | `<prefix>/client/calls` | 1    | count                   | method, status        |
//! | `<prefix>/client/errors`| 1    | count                   | method, reason        |
//! | `<prefix>/client/latency`| ms  | distribution (ms)       | method                |
//! | `<prefix>/client/key_length` | By | distribution (bytes) | method, phase, type   |
//! | `<prefix>/client/value_length` | By | distribution (bytes) | method, phase, type |
//!
//! Every view is partitioned by the full tag-key set; tags not recorded
//! with a sample leave that column empty.

mod buckets;
#[cfg(feature = "metrics")]
mod facade;
mod in_memory;
mod measure;
mod recorder;
mod registry;
mod tags;
mod view;

pub use buckets::{
    BYTES_BOUNDARIES, BucketKind, MILLISECONDS_BOUNDARIES, bucket_index, distribution_boundaries,
};
#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
pub use facade::MetricsFacade;
pub use in_memory::{
    AggregationData, DEFAULT_SAMPLE_CAPACITY, InMemoryStats, RowSnapshot, Sample, StatsSnapshot,
    ViewSnapshot, count_by_tag,
};
pub use measure::{
    DEFAULT_METRIC_PREFIX, Measure, MeasureKind, MeasureValue, Measures, Unit, define_instruments,
};
pub use recorder::{StatsRecorder, record_stat_with_tags};
pub use registry::Registry;
pub use tags::{MAX_TAG_LEN, TagContext, TagKey, TagKeys, TagScope, TagValue, define_tag_keys};
pub use view::{Aggregation, View, ViewManager, build_views, register_all_views};
