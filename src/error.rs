//! Error types for the scorecache library.
//!
//! ## Key Components
//!
//! - [`NotPresent`]: Returned by read operations when the key is absent or
//!   has expired. Part of normal control flow; callers usually react by
//!   loading the value.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. a zero entry bound or a zero expiry duration).
//!
//! Loader failures are not represented here: whatever error type the caller's
//! loader produces is handed back unchanged.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use scorecache::builder::CacheBuilder;
//! use scorecache::error::{ConfigError, NotPresent};
//!
//! let cache = CacheBuilder::new().max_entries(10).build::<String, u32>();
//! assert_eq!(cache.get_if_present(&"missing".to_string()), Err(NotPresent));
//!
//! let bad: Result<_, ConfigError> = CacheBuilder::new()
//!     .expire_after_write(Duration::ZERO)
//!     .try_build::<String, u32>();
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// NotPresent
// ---------------------------------------------------------------------------

/// The requested key is not in the cache, or it was found expired and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("cache: value not present")]
pub struct NotPresent;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use scorecache::builder::CacheBuilder;
///
/// let err = CacheBuilder::new()
///     .max_entries(0)
///     .try_build::<u64, u64>()
///     .unwrap_err();
/// assert!(err.to_string().contains("max_entries"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
