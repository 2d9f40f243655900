//! # Cache Trait Hierarchy
//!
//! Small traits at the seams between the engine and its callers, so code can
//! be written once against a single-lock [`Cache`](crate::cache::Cache) or a
//! lock-sharded `ShardedCache`.
//!
//! ```text
//!   ┌─────────────────────────────────────────────┐
//!   │           ConcurrentCache<K, V>             │
//!   │                                             │
//!   │  get_if_present(&K) → Result<Arc<V>, _>     │
//!   │  get_with(&K, loader) → Result<Arc<V>, E>   │
//!   │  refresh_with(&K, loader)                   │
//!   │  put(K, V) / invalidate(&K) / clean_up()    │
//!   └──────────────────────┬──────────────────────┘
//!                          │ used by
//!                          ▼
//!              LoadingCache<K, V, L, C>
//!
//!   ExpiringCache<K>   set_expires_at / set_expires_in
//!   PriorityCache<K>   set_weight
//!   StatsCache         stats / hit_rate / hit_count / request_count / ...
//! ```
//!
//! | Trait             | Purpose                                       |
//! |-------------------|-----------------------------------------------|
//! | `ConcurrentCache` | Shared-handle reads, writes and maintenance   |
//! | `ExpiringCache`   | Per-key deadline overrides                    |
//! | `PriorityCache`   | Per-key weight overrides                      |
//! | `StatsCache`      | Statistics accessors                          |

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::NotPresent;
use crate::policy::maintenance::PassOutcome;
use crate::stats::CacheStats;

/// Operations every thread-safe cache handle supports.
///
/// All methods take `&self`; implementations synchronize internally.
pub trait ConcurrentCache<K, V>: Send + Sync {
    /// Returns the live value for `key`, or [`NotPresent`] if it is absent or
    /// expired. Records a request, and a hit on success.
    fn get_if_present(&self, key: &K) -> Result<Arc<V>, NotPresent>;

    /// Returns the live value for `key`, invoking `loader` on a miss and
    /// caching its result. A loader error is returned unchanged and nothing
    /// is cached.
    fn get_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>;

    /// Invokes `loader` unconditionally and overwrites the cached value.
    fn refresh_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>;

    /// Stores `value` under `key`, running maintenance first if it is due.
    fn put(&self, key: K, value: V);

    /// Removes `key`. A no-op if the key is absent.
    fn invalidate(&self, key: &K);

    /// Removes every entry.
    fn invalidate_all(&self);

    /// Runs one maintenance pass now.
    fn clean_up(&self) -> PassOutcome;

    /// Number of stored entries, expired ones included until they are swept.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caches whose per-key deadlines can be overridden after insertion.
///
/// Overrides only apply to present keys and return `false` otherwise. A
/// stamp is compared to the clock only when the cache has an expiry policy.
pub trait ExpiringCache<K> {
    fn set_expires_at(&self, key: &K, expires_at: Instant) -> bool;

    fn set_expires_in(&self, key: &K, expires_in: Duration) -> bool;
}

/// Caches whose per-key weights can be overridden after insertion.
pub trait PriorityCache<K> {
    /// Replaces the weight of a present key. Returns `false` if absent.
    fn set_weight(&self, key: &K, weight: u64) -> bool;
}

/// Read access to cache statistics.
pub trait StatsCache {
    fn stats(&self) -> CacheStats;

    fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    fn hit_count(&self) -> u64 {
        self.stats().hits
    }

    fn request_count(&self) -> u64 {
        self.stats().requests
    }

    fn average_load_penalty(&self) -> Duration {
        self.stats().average_load_penalty
    }

    fn eviction_count(&self) -> u64 {
        self.stats().evictions
    }
}
