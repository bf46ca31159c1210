//! Views: an instrument bound to an aggregation and a tag-key partition.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use super::buckets::{BucketKind, distribution_boundaries};
use super::measure::{Measure, Measures};
use super::tags::{TagKey, TagKeys};
use crate::error::{Error, Result};

/// How samples of a view are aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Aggregation {
    /// Number of samples recorded.
    Count,
    /// Bucketed distribution with the given boundaries.
    Distribution(Vec<f64>),
}

impl Aggregation {
    /// Creates a distribution aggregation using a fixed boundary list.
    pub fn distribution(kind: BucketKind) -> Self {
        Aggregation::Distribution(distribution_boundaries(kind).to_vec())
    }

    /// Returns the bucket boundaries, if this is a distribution.
    pub fn boundaries(&self) -> Option<&[f64]> {
        match self {
            Aggregation::Count => None,
            Aggregation::Distribution(b) => Some(b),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Count => write!(f, "count"),
            Aggregation::Distribution(b) => write!(f, "distribution({} buckets)", b.len() + 1),
        }
    }
}

/// A registered binding of an instrument, an aggregation and tag columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    measure: Measure,
    aggregation: Aggregation,
    columns: Vec<TagKey>,
}

impl View {
    /// Creates a view.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        measure: Measure,
        aggregation: Aggregation,
        columns: Vec<TagKey>,
    ) -> Self {
        Self { name: name.into(), description: description.into(), measure, aggregation, columns }
    }

    /// Returns the view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the aggregated instrument.
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Returns the aggregation.
    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Returns the tag keys partitioning the aggregation.
    pub fn columns(&self) -> &[TagKey] {
        &self.columns
    }

    /// Checks that the view is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_view("view name cannot be empty"));
        }
        if let Aggregation::Distribution(b) = &self.aggregation {
            if b.is_empty() {
                return Err(Error::invalid_view(format!(
                    "view '{}' has a distribution with no boundaries",
                    self.name
                )));
            }
            if !b.windows(2).all(|w| w[0] < w[1]) {
                return Err(Error::invalid_view(format!(
                    "view '{}' has boundaries that are not strictly increasing",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Backend-side registry of views.
///
/// Measurements only become observable for instruments that have at least
/// one registered view.
pub trait ViewManager {
    /// Registers `view`.
    ///
    /// Re-registering an identical view may succeed; registering a different
    /// view under an existing name must fail with
    /// [`ErrorKind::DuplicateView`](crate::ErrorKind::DuplicateView).
    fn register_view(&self, view: &View) -> Result<()>;
}

/// Builds the five standard views, each partitioned by every tag key.
///
/// | View             | Aggregation                  |
/// |------------------|------------------------------|
/// | latency          | distribution (milliseconds)  |
/// | calls            | count                        |
/// | errors           | count                        |
/// | key length       | distribution (bytes)         |
/// | value length     | distribution (bytes)         |
pub fn build_views(measures: &Measures, tag_keys: &TagKeys) -> Vec<View> {
    let columns = tag_keys.all();
    vec![
        View::new(
            measures.latency_ms.name().to_string(),
            "The distribution of call latencies",
            measures.latency_ms.clone(),
            Aggregation::distribution(BucketKind::Milliseconds),
            columns.clone(),
        ),
        View::new(
            measures.calls.name().to_string(),
            "The number of calls",
            measures.calls.clone(),
            Aggregation::Count,
            columns.clone(),
        ),
        View::new(
            measures.errors.name().to_string(),
            "The number of errors",
            measures.errors.clone(),
            Aggregation::Count,
            columns.clone(),
        ),
        View::new(
            measures.key_length.name().to_string(),
            "The distribution of statement text lengths",
            measures.key_length.clone(),
            Aggregation::distribution(BucketKind::Bytes),
            columns.clone(),
        ),
        View::new(
            measures.value_length.name().to_string(),
            "The distribution of bound value lengths",
            measures.value_length.clone(),
            Aggregation::distribution(BucketKind::Bytes),
            columns,
        ),
    ]
}

/// Registers every view with `manager`, stopping at the first failure.
pub fn register_all_views(manager: &dyn ViewManager, views: &[View]) -> Result<()> {
    for view in views {
        view.validate()?;
        manager.register_view(view)?;
        tracing::debug!(view = view.name(), aggregation = %view.aggregation(), "registered view");
    }
    tracing::info!(count = views.len(), "registered instrumentation views");
    Ok(())
}
