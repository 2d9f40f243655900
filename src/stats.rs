//! Cache statistics.
//!
//! Counters are updated under the cache lock and read back as a
//! [`CacheStats`] snapshot taken in one lock hold.
//!
//! ## Average load penalty
//!
//! The average load penalty is a recurrence, not an arithmetic mean:
//!
//! ```text
//!   load_count += 1
//!   avg = (avg + latency) / load_count
//! ```
//!
//! Failed loads do not enter the recurrence; they are counted separately in
//! `load_failures`.

use std::time::Duration;

/// Point-in-time snapshot of cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found a live entry.
    pub hits: u64,
    /// All reads, hit or miss.
    pub requests: u64,
    /// Successful loader invocations.
    pub load_count: u64,
    /// Loader invocations that returned an error.
    pub load_failures: u64,
    /// Running load latency recurrence.
    pub average_load_penalty: Duration,
    /// Entries removed by any path: invalidation, expiry or eviction.
    pub evictions: u64,
}

impl CacheStats {
    /// `hits / requests`, or `0.0` before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }

    pub fn misses(&self) -> u64 {
        self.requests.saturating_sub(self.hits)
    }

    /// Folds per-shard snapshots into one. Counters are summed; average load
    /// penalties are combined weighted by each shard's load count.
    pub fn combine<I>(parts: I) -> CacheStats
    where
        I: IntoIterator<Item = CacheStats>,
    {
        let mut total = CacheStats::default();
        let mut weighted_nanos: u128 = 0;
        for part in parts {
            total.hits += part.hits;
            total.requests += part.requests;
            total.load_count += part.load_count;
            total.load_failures += part.load_failures;
            total.evictions += part.evictions;
            weighted_nanos += part.average_load_penalty.as_nanos() * u128::from(part.load_count);
        }
        if total.load_count > 0 {
            let nanos = weighted_nanos / u128::from(total.load_count);
            total.average_load_penalty = Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX));
        }
        total
    }
}

/// Mutable counters owned by a cache and guarded by its lock.
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    hits: u64,
    requests: u64,
    load_count: u64,
    load_failures: u64,
    average_load_penalty: Duration,
    evictions: u64,
}

impl StatsCounter {
    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.requests += 1;
        self.hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.requests += 1;
    }

    pub(crate) fn record_load(&mut self, latency: Duration) {
        self.load_count += 1;
        let sum = self.average_load_penalty.as_nanos() + latency.as_nanos();
        let nanos = sum / u128::from(self.load_count);
        self.average_load_penalty = Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX));
    }

    #[inline]
    pub(crate) fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    #[inline]
    pub(crate) fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            requests: self.requests,
            load_count: self.load_count,
            load_failures: self.load_failures,
            average_load_penalty: self.average_load_penalty,
            evictions: self.evictions,
        }
    }
}
