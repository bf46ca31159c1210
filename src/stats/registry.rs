//! The instrumentation vocabulary as one explicit object.

use super::measure::{Measures, define_instruments};
use super::tags::{TagKeys, define_tag_keys};
use super::view::{View, ViewManager, build_views, register_all_views};
use crate::config::InstrumentationConfig;
use crate::error::Result;

/// Tag keys, instruments and views for one process.
///
/// Construct once at startup, register its views, then share it (usually in
/// an `Arc` inside an [`Instrumenter`](crate::Instrumenter)) with everything
/// that creates tracking operations.
///
/// ## Example
///
/// ```rust
/// use dbcensus::{InstrumentationConfig, stats::{InMemoryStats, Registry}};
///
/// let registry = Registry::new(&InstrumentationConfig::default())?;
/// let stats = InMemoryStats::new();
/// registry.register_all_views(&stats)?;
/// assert_eq!(stats.registered_views().len(), 5);
/// # Ok::<(), dbcensus::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    tag_keys: TagKeys,
    measures: Measures,
    views: Vec<View>,
}

impl Registry {
    /// Builds the vocabulary described by `config`.
    pub fn new(config: &InstrumentationConfig) -> Result<Self> {
        config.validate()?;
        let tag_keys = define_tag_keys();
        let measures = define_instruments(&config.metric_prefix);
        let views = build_views(&measures, &tag_keys);
        Ok(Self { tag_keys, measures, views })
    }

    /// Returns the tag keys.
    pub fn tag_keys(&self) -> &TagKeys {
        &self.tag_keys
    }

    /// Returns the instruments.
    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    /// Returns the views.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Registers every view with `manager`.
    ///
    /// Call exactly once per process. An error here means the view set is
    /// inconsistent with what the backend already holds and should abort
    /// startup.
    pub fn register_all_views(&self, manager: &dyn ViewManager) -> Result<()> {
        register_all_views(manager, &self.views)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let tag_keys = define_tag_keys();
        let measures = Measures::default();
        let views = build_views(&measures, &tag_keys);
        Self { tag_keys, measures, views }
    }
}
