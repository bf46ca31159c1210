//! Instrumentation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::DEFAULT_METRIC_PREFIX;

/// Configuration for the instrumentation layer.
///
/// ## Default Values
///
/// - `metric_prefix`: `"sql"`
/// - `record_sizes`: `true`
/// - `trace_statement_text`: `false`
/// - `log_backend_failures`: `true`
///
/// ## Example
///
/// ```rust
/// use dbcensus::InstrumentationConfig;
///
/// let config = InstrumentationConfig::builder()
///     .metric_prefix("jdbc")
///     .trace_statement_text(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
///
/// The configuration can also be loaded from any serde format; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Prefix for instrument and view names, e.g. `sql/client/calls`.
    #[builder(into, default = DEFAULT_METRIC_PREFIX.to_string())]
    pub metric_prefix: String,

    /// Whether to record statement text and bound value sizes.
    #[builder(default = true)]
    pub record_sizes: bool,

    /// Whether to attach the full statement text to spans.
    ///
    /// Off by default since statement text may carry literal values.
    #[builder(default = false)]
    pub trace_statement_text: bool,

    /// Whether lost samples are logged at `warn` level.
    #[builder(default = true)]
    pub log_backend_failures: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl InstrumentationConfig {
    /// Checks that the configuration can name instruments.
    pub fn validate(&self) -> Result<()> {
        if self.metric_prefix.is_empty() {
            return Err(Error::configuration("metric_prefix must not be empty"));
        }
        if self.metric_prefix.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::configuration(format!(
                "metric_prefix '{}' must not contain whitespace",
                self.metric_prefix.escape_debug()
            )));
        }
        Ok(())
    }
}
