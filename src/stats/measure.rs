//! Measurement instruments.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// Default prefix for instrument and view names.
pub const DEFAULT_METRIC_PREFIX: &str = "sql";

/// Unit of a measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    /// A plain count.
    Dimensionless,
    /// Milliseconds.
    Milliseconds,
    /// Bytes.
    Bytes,
}

impl Unit {
    /// Returns the UCUM unit string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Dimensionless => "1",
            Unit::Milliseconds => "ms",
            Unit::Bytes => "By",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric type of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeasureKind {
    /// 64-bit integer samples.
    Int64,
    /// 64-bit floating point samples.
    Float64,
}

/// A single sample value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    /// Integer sample.
    Int(i64),
    /// Floating point sample.
    Float(f64),
}

impl MeasureValue {
    /// Returns the sample as an `f64`.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            MeasureValue::Int(i) => *i as f64,
            MeasureValue::Float(f) => *f,
        }
    }
}

impl From<i64> for MeasureValue {
    fn from(value: i64) -> Self {
        MeasureValue::Int(value)
    }
}

impl From<usize> for MeasureValue {
    fn from(value: usize) -> Self {
        MeasureValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        MeasureValue::Float(value)
    }
}

/// A named, typed quantity that the backend aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Measure {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    unit: Unit,
    kind: MeasureKind,
}

impl Measure {
    /// Creates an integer instrument.
    pub fn int64(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        unit: Unit,
    ) -> Self {
        Self { name: name.into(), description: description.into(), unit, kind: MeasureKind::Int64 }
    }

    /// Creates a floating point instrument.
    pub fn float64(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        unit: Unit,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit,
            kind: MeasureKind::Float64,
        }
    }

    /// Returns the instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the numeric type.
    pub fn kind(&self) -> MeasureKind {
        self.kind
    }
}

/// The fixed set of instruments recorded by tracking operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measures {
    /// Number of calls made.
    pub calls: Measure,
    /// Number of calls that failed.
    pub errors: Measure,
    /// Call latency in milliseconds.
    pub latency_ms: Measure,
    /// Length of statement text in bytes.
    pub key_length: Measure,
    /// Length of bound parameter values in bytes.
    pub value_length: Measure,
}

impl Measures {
    /// Returns all instruments.
    pub fn all(&self) -> [&Measure; 5] {
        [&self.calls, &self.errors, &self.latency_ms, &self.key_length, &self.value_length]
    }
}

impl Default for Measures {
    fn default() -> Self {
        define_instruments(DEFAULT_METRIC_PREFIX)
    }
}

/// Returns the constant set of instruments, named under `prefix`.
///
/// ```rust
/// use dbcensus::stats::define_instruments;
///
/// let measures = define_instruments("sql");
/// assert_eq!(measures.latency_ms.name(), "sql/client/latency");
/// ```
pub fn define_instruments(prefix: &str) -> Measures {
    Measures {
        calls: Measure::int64(
            format!("{prefix}/client/calls"),
            "The number of calls made",
            Unit::Dimensionless,
        ),
        errors: Measure::int64(
            format!("{prefix}/client/errors"),
            "The number of errors encountered",
            Unit::Dimensionless,
        ),
        latency_ms: Measure::float64(
            format!("{prefix}/client/latency"),
            "The latency of calls in milliseconds",
            Unit::Milliseconds,
        ),
        key_length: Measure::int64(
            format!("{prefix}/client/key_length"),
            "Measures the length of statement text",
            Unit::Bytes,
        ),
        value_length: Measure::int64(
            format!("{prefix}/client/value_length"),
            "Measures the length of bound values",
            Unit::Bytes,
        ),
    }
}
