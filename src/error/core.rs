//! Main error type for the instrumentation layer.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use super::ErrorKind;

/// The error type for registry, configuration and backend failures.
///
/// ## Error Hierarchy
///
/// ```text
/// Error
/// ├── kind: ErrorKind          (category for matching)
/// ├── message: String          (human-readable description)
/// └── source: Option           (underlying cause)
/// ```
///
/// ## Example
///
/// ```rust
/// use dbcensus::{Error, ErrorKind};
///
/// let err = Error::duplicate_view("sql/client/latency");
/// assert_eq!(err.kind(), ErrorKind::DuplicateView);
/// assert!(err.is_fatal());
/// ```
#[derive(Debug)]
pub struct Error {
    /// The error category.
    kind: ErrorKind,

    /// Human-readable error message.
    message: Cow<'static, str>,

    /// The underlying error, if any.
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dbcensus::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::Configuration, "metric prefix cannot be empty");
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if this error should abort process startup.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Sets the source error for this error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    /// Creates a duplicate view error for the named view.
    pub fn duplicate_view(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateView,
            format!("view '{name}' is already registered with a different definition"),
        )
    }

    /// Creates an invalid view error.
    pub fn invalid_view(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidView, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    /// Creates a tag scope error.
    pub fn tag_scope(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TagScope, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self::new(kind, message)
    }
}
