//! Error kind enumeration for categorizing instrumentation errors.

/// Categorization of instrumentation errors.
///
/// | ErrorKind       | Raised by                     | Action                          |
/// |-----------------|-------------------------------|---------------------------------|
/// | `DuplicateView` | view registration             | Fix the view definitions        |
/// | `InvalidView`   | view registration             | Fix the view definitions        |
/// | `Configuration` | config validation             | Fix the configuration           |
/// | `Backend`       | stats recorders               | Logged and dropped by callers   |
/// | `TagScope`      | tag context construction      | Fix the tag pairs               |
///
/// Only `Backend` is expected at steady state, and it never reaches the
/// caller of an instrumented driver method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A view with the same name but a different definition is already
    /// registered.
    ///
    /// **Fatal at startup.** Indicates a programming error in the view set.
    #[error("duplicate view")]
    DuplicateView,

    /// A view definition is malformed (empty name, no boundaries, unsorted
    /// boundaries).
    #[error("invalid view")]
    InvalidView,

    /// Instrumentation configuration is invalid.
    #[error("configuration error")]
    Configuration,

    /// The stats or tracing backend failed to record a measurement.
    ///
    /// Instrumentation logs this and continues; the wrapped call is
    /// unaffected.
    #[error("backend error")]
    Backend,

    /// A tag context could not be built from the supplied pairs.
    #[error("tag scope error")]
    TagScope,
}

impl ErrorKind {
    /// Returns `true` if this error should abort process startup.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dbcensus::ErrorKind;
    ///
    /// assert!(ErrorKind::DuplicateView.is_fatal());
    /// assert!(!ErrorKind::Backend.is_fatal());
    /// ```
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::DuplicateView | ErrorKind::InvalidView | ErrorKind::Configuration
        )
    }
}
