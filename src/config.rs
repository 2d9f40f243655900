//! Immutable policy configuration for a [`Cache`](crate::cache::Cache).
//!
//! A `CacheConfig` is produced by [`CacheBuilder`](crate::builder::CacheBuilder)
//! and frozen once the cache is constructed. Every bound is optional; `None`
//! means the policy is inactive.
//!
//! | Option                 | Type       | Default | Effect                                     |
//! |------------------------|------------|---------|--------------------------------------------|
//! | `max_entries`          | `usize`    | none    | maintenance when `len >= max`              |
//! | `max_weight`           | `u64`      | none    | maintenance when `total_weight >= max`     |
//! | `expire_after_write`   | `Duration` | none    | deadline fixed at write time               |
//! | `expire_after_access`  | `Duration` | none    | deadline pushed forward on read and write  |
//! | `periodic_maintenance` | `Duration` | none    | maintenance at most once per interval      |
//! | `default_weight`       | `u64`      | 1       | weight assigned on every write             |
//!
//! Only one time policy governs expiry. When both durations are set,
//! write-expiry wins.

use std::time::Duration;

use crate::error::ConfigError;

/// The expiry semantics actually applied to entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePolicy {
    /// Stamps record the last write or read; they are never compared to `now`.
    None,
    /// Deadline = write time + duration; reads do not move it.
    AfterWrite(Duration),
    /// Deadline = last access + duration; refreshed on every read and write.
    AfterAccess(Duration),
}

impl TimePolicy {
    /// Returns `true` if stamps are deadlines.
    #[inline]
    pub fn is_deadline(&self) -> bool {
        !matches!(self, TimePolicy::None)
    }
}

/// Policy configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub(crate) max_entries: Option<usize>,
    pub(crate) max_weight: Option<u64>,
    pub(crate) expire_after_write: Option<Duration>,
    pub(crate) expire_after_access: Option<Duration>,
    pub(crate) periodic_maintenance: Option<Duration>,
    pub(crate) default_weight: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            max_weight: None,
            expire_after_write: None,
            expire_after_access: None,
            periodic_maintenance: None,
            default_weight: 1,
        }
    }
}

impl CacheConfig {
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    pub fn max_weight(&self) -> Option<u64> {
        self.max_weight
    }

    pub fn expire_after_write(&self) -> Option<Duration> {
        self.expire_after_write
    }

    pub fn expire_after_access(&self) -> Option<Duration> {
        self.expire_after_access
    }

    pub fn periodic_maintenance(&self) -> Option<Duration> {
        self.periodic_maintenance
    }

    pub fn default_weight(&self) -> u64 {
        self.default_weight
    }

    /// The time policy in effect. Write-expiry takes priority over
    /// access-expiry.
    pub fn time_policy(&self) -> TimePolicy {
        match (self.expire_after_write, self.expire_after_access) {
            (Some(d), _) => TimePolicy::AfterWrite(d),
            (None, Some(d)) => TimePolicy::AfterAccess(d),
            (None, None) => TimePolicy::None,
        }
    }

    /// Returns `true` if an entry-count or aggregate-weight bound is set.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.max_entries.is_some() || self.max_weight.is_some()
    }

    /// Returns `true` if `len` entries totalling `total_weight` sit at or
    /// above any configured bound.
    #[inline]
    pub fn under_pressure(&self, len: usize, total_weight: u64) -> bool {
        self.max_entries.is_some_and(|max| len >= max)
            || self.max_weight.is_some_and(|max| total_weight >= max)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == Some(0) {
            return Err(ConfigError::new("max_entries must be > 0"));
        }
        if self.max_weight == Some(0) {
            return Err(ConfigError::new("max_weight must be > 0"));
        }
        if self.expire_after_write == Some(Duration::ZERO) {
            return Err(ConfigError::new("expire_after_write must be non-zero"));
        }
        if self.expire_after_access == Some(Duration::ZERO) {
            return Err(ConfigError::new("expire_after_access must be non-zero"));
        }
        if self.periodic_maintenance == Some(Duration::ZERO) {
            return Err(ConfigError::new("periodic_maintenance must be non-zero"));
        }
        if self.default_weight == 0 {
            return Err(ConfigError::new("default_weight must be > 0"));
        }
        Ok(())
    }
}
