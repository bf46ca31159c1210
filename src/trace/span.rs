//! Span status and attribute types.

/// Status of a span.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpanStatus {
    /// Span status is unset.
    #[default]
    Unset,
    /// Span completed successfully.
    Ok,
    /// Span completed with an unknown/internal error.
    Error(String),
}

impl SpanStatus {
    /// Returns `true` if the span status is Ok.
    pub fn is_ok(&self) -> bool {
        matches!(self, SpanStatus::Ok)
    }

    /// Returns `true` if the span status is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, SpanStatus::Error(_))
    }

    /// Returns the error description if this is an error status.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            SpanStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the OpenTelemetry status code string.
    pub fn otel_code(&self) -> &'static str {
        match self {
            SpanStatus::Unset => "UNSET",
            SpanStatus::Ok => "OK",
            SpanStatus::Error(_) => "ERROR",
        }
    }
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanStatus::Ok => write!(f, "ok"),
            SpanStatus::Error(msg) => write!(f, "error: {}", msg),
            SpanStatus::Unset => write!(f, "unset"),
        }
    }
}

/// A value that can be attached to a span as an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A float value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl SpanValue {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpanValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SpanValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpanValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanValue::String(s) => write!(f, "{}", s),
            SpanValue::Int(i) => write!(f, "{}", i),
            SpanValue::Float(fl) => write!(f, "{}", fl),
            SpanValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for SpanValue {
    fn from(s: &str) -> Self {
        SpanValue::String(s.to_string())
    }
}

impl From<String> for SpanValue {
    fn from(s: String) -> Self {
        SpanValue::String(s)
    }
}

impl From<i64> for SpanValue {
    fn from(i: i64) -> Self {
        SpanValue::Int(i)
    }
}

impl From<usize> for SpanValue {
    fn from(i: usize) -> Self {
        SpanValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<u64> for SpanValue {
    fn from(i: u64) -> Self {
        SpanValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for SpanValue {
    fn from(f: f64) -> Self {
        SpanValue::Float(f)
    }
}

impl From<bool> for SpanValue {
    fn from(b: bool) -> Self {
        SpanValue::Bool(b)
    }
}

/// Attribute keys recorded on driver spans.
///
/// Names follow the OpenTelemetry database semantic conventions.
pub mod attribute_keys {
    /// Always `sql`.
    pub const DB_SYSTEM: &str = "db.system";
    /// The wrapped method, e.g. `execute`.
    pub const DB_METHOD: &str = "db.method";
    /// The SQL verb, e.g. `SELECT`.
    pub const DB_OPERATION: &str = "db.operation";
    /// The full statement text, when enabled.
    pub const DB_STATEMENT: &str = "db.statement";
    /// Rows affected or returned.
    pub const DB_ROWS_AFFECTED: &str = "db.rows_affected";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_status() {
        assert!(SpanStatus::Ok.is_ok());
        assert!(!SpanStatus::Ok.is_error());
        assert!(!SpanStatus::Unset.is_ok());

        let error = SpanStatus::Error("MockError: boom".to_string());
        assert!(error.is_error());
        assert!(!error.is_ok());
        assert_eq!(error.error_message(), Some("MockError: boom"));
        assert_eq!(error.otel_code(), "ERROR");
    }

    #[test]
    fn test_span_status_display() {
        assert_eq!(SpanStatus::Ok.to_string(), "ok");
        assert_eq!(SpanStatus::Unset.to_string(), "unset");
        assert_eq!(SpanStatus::Error("boom".into()).to_string(), "error: boom");
    }

    #[test]
    fn test_span_value_conversions() {
        assert_eq!(SpanValue::from("SELECT 1").as_str(), Some("SELECT 1"));
        assert_eq!(SpanValue::from(42i64).as_int(), Some(42));
        assert_eq!(SpanValue::from(3usize), SpanValue::Int(3));
        assert_eq!(SpanValue::from(true).to_string(), "true");
    }
}
