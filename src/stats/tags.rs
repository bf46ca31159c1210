//! Tag keys, tag values and the ambient tag context.
//!
//! A [`TagContext`] is a set of key/value pairs attached to a measurement.
//! Contexts can be entered as a scope on the current thread; the scope is
//! popped when the returned [`TagScope`] guard drops, on every exit path.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::error::{Error, Result};

/// Maximum length of a tag key or tag value, in bytes.
pub const MAX_TAG_LEN: usize = 255;

/// A named dimension used to partition measurements.
///
/// Tag keys compare by name, so two independently constructed keys with the
/// same name are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TagKey(Cow<'static, str>);

impl TagKey {
    /// The wrapped method name, e.g. `execute`.
    pub const METHOD: TagKey = TagKey::from_static("method");
    /// The call phase, e.g. `execute` or `fetch`.
    pub const PHASE: TagKey = TagKey::from_static("phase");
    /// The error description of a failed call.
    pub const REASON: TagKey = TagKey::from_static("reason");
    /// The statement type, e.g. `SELECT`.
    pub const TYPE: TagKey = TagKey::from_static("type");
    /// The call outcome, `ok` or `error`.
    pub const STATUS: TagKey = TagKey::from_static("status");

    /// Creates a tag key from a static name.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a tag key, validating its name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_TAG_LEN || !is_printable(&name) {
            return Err(Error::tag_scope(format!("invalid tag key '{name}'")));
        }
        Ok(Self(name))
    }

    /// Returns the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The value half of a tag pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TagValue(Cow<'static, str>);

impl TagValue {
    /// Outcome value for a call that returned normally.
    pub const OK: TagValue = TagValue::from_static("ok");
    /// Outcome value for a call that failed.
    pub const ERROR: TagValue = TagValue::from_static("error");

    /// Creates a tag value from a static string.
    pub const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Creates a tag value from arbitrary text, replacing control characters
    /// with spaces and truncating to [`MAX_TAG_LEN`] bytes on a char boundary.
    ///
    /// Error descriptions go through this before being used as a `reason`.
    ///
    /// ```rust
    /// use dbcensus::stats::TagValue;
    ///
    /// let value = TagValue::sanitized("line one\nline two");
    /// assert_eq!(value.as_str(), "line one line two");
    /// ```
    pub fn sanitized(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        let mut out = String::with_capacity(text.len().min(MAX_TAG_LEN));
        for ch in text.chars() {
            let ch = if ch.is_control() { ' ' } else { ch };
            if out.len() + ch.len_utf8() > MAX_TAG_LEN {
                break;
            }
            out.push(ch);
        }
        Self(Cow::Owned(out))
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(&self) -> Result<()> {
        if self.0.len() > MAX_TAG_LEN || !is_printable(&self.0) {
            return Err(Error::tag_scope(format!("invalid tag value '{}'", self.0)));
        }
        Ok(())
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TagValue {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for TagValue {
    fn from(value: Cow<'static, str>) -> Self {
        Self(value)
    }
}

fn is_printable(text: &str) -> bool {
    !text.chars().any(char::is_control)
}

/// The fixed set of tag keys every view is partitioned by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKeys {
    /// `method`
    pub method: TagKey,
    /// `phase`
    pub phase: TagKey,
    /// `reason`
    pub reason: TagKey,
    /// `type`
    pub kind: TagKey,
    /// `status`
    pub status: TagKey,
}

impl TagKeys {
    /// Returns all keys in column order.
    pub fn all(&self) -> Vec<TagKey> {
        vec![
            self.method.clone(),
            self.phase.clone(),
            self.reason.clone(),
            self.kind.clone(),
            self.status.clone(),
        ]
    }
}

impl Default for TagKeys {
    fn default() -> Self {
        define_tag_keys()
    }
}

/// Returns the constant set of tag keys.
///
/// Pure; every call returns an equal set.
pub fn define_tag_keys() -> TagKeys {
    TagKeys {
        method: TagKey::METHOD,
        phase: TagKey::PHASE,
        reason: TagKey::REASON,
        kind: TagKey::TYPE,
        status: TagKey::STATUS,
    }
}

/// An ordered set of tag pairs, at most one value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagContext {
    tags: Vec<(TagKey, TagValue)>,
}

thread_local! {
    static AMBIENT: RefCell<Vec<TagContext>> = const { RefCell::new(Vec::new()) };
}

impl TagContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from pairs, validating each value.
    ///
    /// Later pairs replace earlier pairs with the same key.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (TagKey, TagValue)>,
    {
        Self::new().merged(pairs)
    }

    /// Returns a copy of this context with the given pairs applied on top.
    pub fn merged<I>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (TagKey, TagValue)>,
    {
        let mut merged = self.clone();
        for (key, value) in pairs {
            value.validate()?;
            merged.insert(key, value);
        }
        Ok(merged)
    }

    fn insert(&mut self, key: TagKey, value: TagValue) {
        match self.tags.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(idx) => self.tags[idx].1 = value,
            Err(idx) => self.tags.insert(idx, (key, value)),
        }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &TagKey) -> Option<&TagValue> {
        self.tags
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|idx| &self.tags[idx].1)
    }

    /// Iterates over the pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k, v))
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the context has no pairs.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the innermost context entered on this thread, or an empty
    /// context when no scope is active.
    pub fn current() -> Self {
        AMBIENT
            .try_with(|stack| stack.borrow().last().cloned())
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Makes this context the ambient context of the current thread until
    /// the returned guard drops.
    #[must_use = "the scope ends as soon as the guard is dropped"]
    pub fn enter(self) -> TagScope {
        let depth = AMBIENT
            .try_with(|stack| {
                let mut stack = stack.borrow_mut();
                stack.push(self.clone());
                stack.len() - 1
            })
            .unwrap_or(0);
        TagScope { depth, context: self, _not_send: PhantomData }
    }
}

/// Guard for an entered [`TagContext`].
///
/// Dropping the guard restores the ambient context that was active when the
/// scope was entered, including when unwinding.
#[derive(Debug)]
pub struct TagScope {
    depth: usize,
    context: TagContext,
    // Scopes live on a thread-local stack and must be released on the
    // thread that entered them.
    _not_send: PhantomData<*const ()>,
}

impl TagScope {
    /// Returns the context this scope made ambient.
    pub fn context(&self) -> &TagContext {
        &self.context
    }
}

impl Drop for TagScope {
    fn drop(&mut self) {
        let _ = AMBIENT.try_with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}
