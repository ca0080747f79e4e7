//! Error types for the pincache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by lookups that cannot answer with a plain
//!   `bool`, currently only [`PinnedLruCore::is_pinned`] on an absent key.
//! - [`ConfigError`]: Returned by builder `try_build()` when a size or
//!   capacity parameter is rejected.
//! - [`InvariantError`]: Returned by `check_invariants` when the index and
//!   recency list disagree.
//!
//! ## Example Usage
//!
//! ```
//! use pincache::error::CacheError;
//! use pincache::policy::pinned_lru::PinnedLruCore;
//!
//! let mut cache: PinnedLruCore<&str, u32> = PinnedLruCore::new(2);
//! cache.insert("a", 1);
//!
//! assert_eq!(cache.is_pinned(&"a"), Ok(false));
//! assert!(matches!(cache.is_pinned(&"b"), Err(CacheError::NotFound(_))));
//! ```
//!
//! [`PinnedLruCore::is_pinned`]: crate::policy::pinned_lru::PinnedLruCore::is_pinned

use std::fmt;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache queries on keys that are not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The key is not in the cache. Carries a rendering of the key.
    NotFound(String),
}

impl CacheError {
    pub(crate) fn not_found(key: &impl fmt::Debug) -> Self {
        CacheError::NotFound(format!("{:?}", key))
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound(key) => write!(f, "{}: not in cache", key),
        }
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by the builders' `try_build()` methods. The plain constructors
/// accept any value and leave degenerate configurations to the caller.
///
/// # Example
///
/// ```
/// use pincache::builder::WeightedLruBuilder;
///
/// let err = WeightedLruBuilder::<u64>::new(0)
///     .try_build::<String>()
///     .unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
