//! Error types for the instrumentation layer.
//!
//! These errors only describe failures of the instrumentation itself:
//! invalid configuration, conflicting view registrations, and stats
//! backends that reject a measurement.
//!
//! ## Key Invariant
//!
//! Errors returned by a wrapped driver are never converted into [`Error`].
//! Traced wrappers return the driver's own error type, unchanged.
//!
//! ```rust,ignore
//! // The driver's error comes back as-is, after being recorded.
//! let err = traced.execute("DELETE FROM t", &[]).unwrap_err();
//! assert_eq!(err, MockError("boom".into()));
//! ```

mod core;
mod kind;

pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for instrumentation operations.
pub type Result<T> = std::result::Result<T, Error>;
