//! Common test harness for dbcensus integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use dbcensus::clock::ManualClock;
use dbcensus::stats::{InMemoryStats, Measure, Measures, Sample};
use dbcensus::testing::{MockConnection, RecordingTracer};
use dbcensus::traced::TracedConnection;
use dbcensus::{InstrumentationConfig, Instrumenter};
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer subscriber filtered by `RUST_LOG`.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An instrumenter wired to in-memory backends and a manual clock.
pub struct Harness {
    pub instrumenter: Instrumenter,
    pub stats: InMemoryStats,
    pub tracer: RecordingTracer,
    pub clock: ManualClock,
}

impl Harness {
    /// Creates a harness with the default configuration and all views
    /// registered.
    pub fn new() -> Result<Self> {
        Self::with_config(InstrumentationConfig::default())
    }

    /// Creates a harness with `config` and all views registered.
    pub fn with_config(config: InstrumentationConfig) -> Result<Self> {
        init_logging();
        let stats = InMemoryStats::new();
        let tracer = RecordingTracer::new();
        let clock = ManualClock::new();
        let instrumenter = Instrumenter::builder()
            .recorder(Arc::new(stats.clone()))
            .tracer(Arc::new(tracer.clone()))
            .clock(Arc::new(clock.clone()))
            .config(config)
            .build()?;
        instrumenter.registry().register_all_views(&stats)?;
        Ok(Self { instrumenter, stats, tracer, clock })
    }

    /// Wraps `conn` with this harness's instrumenter.
    pub fn connect(&self, conn: MockConnection) -> TracedConnection<MockConnection> {
        TracedConnection::new(conn, self.instrumenter.clone())
    }

    /// Returns the raw samples recorded for the instrument `pick` selects.
    pub fn samples(&self, pick: fn(&Measures) -> &Measure) -> Vec<Sample> {
        self.stats.samples_for(pick(self.instrumenter.registry().measures()).name())
    }

    pub fn calls(&self) -> Vec<Sample> {
        self.samples(|m| &m.calls)
    }

    pub fn errors(&self) -> Vec<Sample> {
        self.samples(|m| &m.errors)
    }

    pub fn latency(&self) -> Vec<Sample> {
        self.samples(|m| &m.latency_ms)
    }
}
