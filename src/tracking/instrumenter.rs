//! Factory for tracking operations and the generic wrapping helpers.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use super::operation::TrackingOperation;
use crate::clock::{Clock, MonotonicClock};
use crate::config::InstrumentationConfig;
use crate::error::Result;
use crate::stats::{Registry, StatsRecorder};
use crate::trace::{Tracer, TracingTracer};

/// Marker type: stats recorder not yet provided.
pub struct NoRecorder;

/// Marker type: stats recorder has been provided.
pub struct HasRecorder;

/// Creates [`TrackingOperation`]s against a shared registry and backends.
///
/// Cloning is cheap; clones share the same registry, recorder, tracer and
/// clock.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use dbcensus::{Instrumenter, stats::InMemoryStats};
///
/// let stats = InMemoryStats::new();
/// let instrumenter = Instrumenter::builder().recorder(Arc::new(stats.clone())).build()?;
/// instrumenter.registry().register_all_views(&stats)?;
///
/// let rows: Result<u64, std::io::Error> =
///     instrumenter.instrument("Connection.execute", "execute", || Ok(3));
/// assert_eq!(rows.unwrap(), 3);
/// assert_eq!(stats.samples_for("sql/client/latency").len(), 1);
/// # Ok::<(), dbcensus::Error>(())
/// ```
#[derive(Clone)]
pub struct Instrumenter {
    inner: Arc<InstrumenterInner>,
}

struct InstrumenterInner {
    registry: Arc<Registry>,
    recorder: Arc<dyn StatsRecorder>,
    tracer: Arc<dyn Tracer>,
    clock: Arc<dyn Clock>,
    config: InstrumentationConfig,
}

impl Instrumenter {
    /// Creates a builder. A stats recorder is required.
    pub fn builder() -> InstrumenterBuilder<NoRecorder> {
        InstrumenterBuilder::new()
    }

    /// Returns the instrumentation vocabulary.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Returns the shared registry handle.
    pub fn shared_registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    /// Returns the stats recorder.
    pub fn recorder(&self) -> &dyn StatsRecorder {
        self.inner.recorder.as_ref()
    }

    /// Returns the tracer.
    pub fn tracer(&self) -> &dyn Tracer {
        self.inner.tracer.as_ref()
    }

    /// Returns the clock.
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InstrumentationConfig {
        &self.inner.config
    }

    /// Starts tracking one call.
    pub fn start(
        &self,
        span_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
    ) -> TrackingOperation {
        TrackingOperation::create(self, span_name, method)
    }

    /// Runs `f` as a tracked call.
    ///
    /// On `Ok` the operation is closed and the value returned unchanged. On
    /// `Err` the error is recorded, the operation closed and the same error
    /// returned. A panic in `f` closes the operation while unwinding.
    pub fn instrument<T, E, F>(
        &self,
        span_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
        f: F,
    ) -> std::result::Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        self.instrument_with(span_name, method, |_| f())
    }

    /// Like [`instrument`](Self::instrument), but hands the open operation
    /// to `f` so it can attach attributes or record sizes.
    ///
    /// `f` runs inside the operation's `tracing` span when there is one.
    pub fn instrument_with<T, E, F>(
        &self,
        span_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
        f: F,
    ) -> std::result::Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&mut TrackingOperation) -> std::result::Result<T, E>,
    {
        let mut op = self.start(span_name, method);
        let result = match op.tracing_span() {
            Some(span) => span.in_scope(|| f(&mut op)),
            None => f(&mut op),
        };
        if let Err(err) = &result {
            op.record_exception(err);
        }
        op.close();
        result
    }

    /// Awaits `fut` as a tracked call, with the operation's `tracing` span
    /// attached to the future.
    ///
    /// Dropping the returned future before completion closes the operation
    /// without recording an error.
    pub async fn instrument_async<T, E, Fut>(
        &self,
        span_name: impl Into<Cow<'static, str>>,
        method: impl Into<Cow<'static, str>>,
        fut: Fut,
    ) -> std::result::Result<T, E>
    where
        E: fmt::Display,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        use tracing::Instrument;

        let mut op = self.start(span_name, method);
        let result = match op.tracing_span() {
            Some(span) => fut.instrument(span).await,
            None => fut.await,
        };
        if let Err(err) = &result {
            op.record_exception(err);
        }
        op.close();
        result
    }
}

impl fmt::Debug for Instrumenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumenter")
            .field("recorder", &self.inner.recorder)
            .field("tracer", &self.inner.tracer)
            .field("clock", &self.inner.clock)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Instrumenter`].
///
/// Uses the typestate pattern so a recorder must be supplied before
/// [`build`](InstrumenterBuilder::build) is available.
///
/// ## Optional Configuration
///
/// - `registry()`: a prebuilt [`Registry`]; otherwise one is built from the config
/// - `tracer()`: defaults to [`TracingTracer`]
/// - `clock()`: defaults to [`MonotonicClock`]
/// - `config()`: defaults to [`InstrumentationConfig::default`]
pub struct InstrumenterBuilder<RecorderState> {
    registry: Option<Arc<Registry>>,
    recorder: Option<Arc<dyn StatsRecorder>>,
    tracer: Option<Arc<dyn Tracer>>,
    clock: Option<Arc<dyn Clock>>,
    config: InstrumentationConfig,
    _recorder_state: PhantomData<RecorderState>,
}

impl InstrumenterBuilder<NoRecorder> {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            registry: None,
            recorder: None,
            tracer: None,
            clock: None,
            config: InstrumentationConfig::default(),
            _recorder_state: PhantomData,
        }
    }

    /// Sets the stats recorder.
    #[must_use]
    pub fn recorder(self, recorder: Arc<dyn StatsRecorder>) -> InstrumenterBuilder<HasRecorder> {
        InstrumenterBuilder {
            registry: self.registry,
            recorder: Some(recorder),
            tracer: self.tracer,
            clock: self.clock,
            config: self.config,
            _recorder_state: PhantomData,
        }
    }
}

impl Default for InstrumenterBuilder<NoRecorder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> InstrumenterBuilder<R> {
    /// Uses an existing registry instead of building one from the config.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the tracer.
    #[must_use]
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Sets the clock used for latency.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: InstrumentationConfig) -> Self {
        self.config = config;
        self
    }
}

impl InstrumenterBuilder<HasRecorder> {
    /// Builds the instrumenter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config fails validation.
    pub fn build(self) -> Result<Instrumenter> {
        self.config.validate()?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(Registry::new(&self.config)?),
        };
        let Some(recorder) = self.recorder else {
            return Err(crate::Error::configuration("a stats recorder is required"));
        };

        Ok(Instrumenter {
            inner: Arc::new(InstrumenterInner {
                registry,
                recorder,
                tracer: self.tracer.unwrap_or_else(|| Arc::new(TracingTracer::new())),
                clock: self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new())),
                config: self.config,
            }),
        })
    }
}
