//! The cache engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Cache<K, V>  (cloneable handle)                                     │
//! │                                                                      │
//! │   Arc<Shared>                                                        │
//! │     ├── config: CacheConfig              immutable                   │
//! │     └── state: parking_lot::Mutex<State>                             │
//! │            ├── store: EntryStore<K, V>   value + stamp + weight      │
//! │            ├── stats: StatsCounter                                   │
//! │            └── next_maintenance: Option<Instant>                     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Flows
//!
//! ```text
//!   put(k, v)
//!     1. lock, ask the trigger whether maintenance is due, unlock
//!     2. if due: clean_up()  (re-locks, runs one pass)
//!     3. lock, write record with stamp per time policy, unlock
//!
//!   get_if_present(k)                      (one lock hold)
//!     1. deadline passed?  → remove, count eviction
//!     2. hit  → refresh stamp (no policy: now, access-expiry: now + d)
//!     3. count request (+ hit)
//!
//!   get_with(k, loader)
//!     1. get_if_present(k)
//!     2. miss → loader(k) with no lock held, time it
//!     3. record latency, put(k, value)
//! ```
//!
//! ## Stamp Semantics
//!
//! | Time policy    | Stamp on write  | Stamp on hit       | Compared to now |
//! |----------------|-----------------|--------------------|-----------------|
//! | none           | `now`           | `now`              | never           |
//! | after write    | `now + d`       | unchanged          | yes             |
//! | after access   | `now + d`       | `now + d`          | yes             |
//!
//! ## Thread Safety
//!
//! `Cache` is `Send + Sync` and cloning it shares the same state. One mutex
//! guards everything; a maintenance pass holds it for its full O(n) scan.
//! Loaders run with no lock held, so a slow loader only blocks its caller.
//! Concurrent misses on one key may each run the loader; the last write wins.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use scorecache::builder::CacheBuilder;
//! use scorecache::cache::Cache;
//!
//! let cache: Cache<String, u64> = CacheBuilder::new()
//!     .max_entries(1_000)
//!     .expire_after_access(Duration::from_secs(60))
//!     .build();
//!
//! let value = cache
//!     .get_with(&"answer".to_string(), |_| Ok::<_, std::io::Error>(42))
//!     .unwrap();
//! assert_eq!(*value, 42);
//! assert_eq!(cache.stats().load_count, 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::builder::CacheBuilder;
use crate::config::{CacheConfig, TimePolicy};
use crate::error::NotPresent;
use crate::policy::maintenance::{PassOutcome, maintenance_due, run_pass};
use crate::stats::{CacheStats, StatsCounter};
use crate::store::entry::EntryStore;
use crate::traits::{ConcurrentCache, ExpiringCache, PriorityCache, StatsCache};

/// Periodic interval used by the expiring convenience constructors.
pub const DEFAULT_EXPIRING_MAINTENANCE: Duration = Duration::from_secs(5 * 60);

const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// `now + d`, clamped instead of panicking on overflow.
#[inline]
pub(crate) fn later(now: Instant, d: Duration) -> Instant {
    now.checked_add(d)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

struct State<K, V> {
    store: EntryStore<K, V>,
    stats: StatsCounter,
    next_maintenance: Option<Instant>,
}

struct Shared<K, V> {
    config: CacheConfig,
    state: Mutex<State<K, V>>,
}

/// Thread-safe cache with count, weight and time bounds.
///
/// Construct through [`CacheBuilder`] or one of the convenience constructors.
pub struct Cache<K, V> {
    inner: Arc<Shared<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Cache")
            .field("len", &state.store.len())
            .field("total_weight", &state.store.total_weight())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    /// An unbounded cache with no expiry.
    fn default() -> Self {
        Self::from_config(CacheConfig::default())
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Builds a cache from an already validated configuration.
    pub(crate) fn from_config(config: CacheConfig) -> Self {
        let next_maintenance = config
            .periodic_maintenance()
            .map(|interval| later(Instant::now(), interval));
        Self {
            inner: Arc::new(Shared {
                config,
                state: Mutex::new(State {
                    store: EntryStore::new(),
                    stats: StatsCounter::default(),
                    next_maintenance,
                }),
            }),
        }
    }

    /// An unbounded cache with no expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache bounded to `max_entries` entries.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use scorecache::cache::Cache;
    ///
    /// let cache: Cache<&str, u32> = Cache::with_max_entries(2);
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// cache.put("c", 3);
    /// assert_eq!(cache.len(), 2);
    /// ```
    pub fn with_max_entries(max_entries: usize) -> Self {
        CacheBuilder::new().max_entries(max_entries).build()
    }

    /// A cache whose entries expire `duration` after they were written, with
    /// a periodic sweep every [`DEFAULT_EXPIRING_MAINTENANCE`].
    ///
    /// # Panics
    ///
    /// Panics if `duration` is zero.
    pub fn expiring_after_write(duration: Duration) -> Self {
        CacheBuilder::new()
            .expire_after_write(duration)
            .periodic_maintenance(DEFAULT_EXPIRING_MAINTENANCE)
            .build()
    }

    /// A cache whose entries expire `duration` after they were last read or
    /// written, with a periodic sweep every [`DEFAULT_EXPIRING_MAINTENANCE`].
    ///
    /// # Panics
    ///
    /// Panics if `duration` is zero.
    pub fn expiring_after_access(duration: Duration) -> Self {
        CacheBuilder::new()
            .expire_after_access(duration)
            .periodic_maintenance(DEFAULT_EXPIRING_MAINTENANCE)
            .build()
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Stamp for a write at `now` under the active time policy.
    #[inline]
    fn write_stamp(&self, now: Instant) -> Instant {
        match self.inner.config.time_policy() {
            TimePolicy::None => now,
            TimePolicy::AfterWrite(d) | TimePolicy::AfterAccess(d) => later(now, d),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns the live value for `key`.
    ///
    /// An entry whose deadline has passed is removed (and counted as an
    /// eviction) before the lookup. A hit refreshes the stamp unless the
    /// cache expires after write.
    ///
    /// # Example
    ///
    /// ```
    /// use scorecache::cache::Cache;
    /// use scorecache::error::NotPresent;
    ///
    /// let cache = Cache::new();
    /// cache.put("k", 1);
    /// assert_eq!(cache.get_if_present(&"k").as_deref(), Ok(&1));
    /// assert_eq!(cache.get_if_present(&"other"), Err(NotPresent));
    /// ```
    pub fn get_if_present(&self, key: &K) -> Result<Arc<V>, NotPresent> {
        let now = Instant::now();
        let policy = self.inner.config.time_policy();
        let mut state = self.inner.state.lock();

        if policy.is_deadline() && state.store.stamp(key).is_some_and(|deadline| deadline <= now) {
            state.store.remove(key);
            state.stats.record_evictions(1);
            trace!("removed expired entry on read");
        }

        let Some(value) = state.store.read_raw(key).cloned() else {
            state.stats.record_miss();
            return Err(NotPresent);
        };

        match policy {
            TimePolicy::None => {
                state.store.set_stamp(key, now);
            },
            TimePolicy::AfterAccess(d) => {
                state.store.set_stamp(key, later(now, d));
            },
            TimePolicy::AfterWrite(_) => {},
        }
        state.stats.record_hit();
        Ok(value)
    }

    /// Returns the live value for `key`, loading and caching it on a miss.
    ///
    /// The loader runs without any lock held. Its error is returned as is,
    /// and a failed load caches nothing.
    pub fn get_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        match self.get_if_present(key) {
            Ok(value) => Ok(value),
            Err(NotPresent) => self.load_with(key, loader),
        }
    }

    /// Invokes `loader` regardless of presence and overwrites the entry.
    pub fn refresh_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.load_with(key, loader)
    }

    fn load_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let start = Instant::now();
        match loader(key) {
            Ok(value) => {
                let latency = start.elapsed();
                self.inner.state.lock().stats.record_load(latency);
                let value = Arc::new(value);
                self.put_arc(key.clone(), Arc::clone(&value));
                Ok(value)
            },
            Err(err) => {
                self.inner.state.lock().stats.record_load_failure();
                Err(err)
            },
        }
    }

    /// Returns `true` if `key` is stored and not past its deadline.
    ///
    /// Touches neither stamps nor statistics.
    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        let deadlines = self.inner.config.time_policy().is_deadline();
        let state = self.inner.state.lock();
        match state.store.stamp(key) {
            Some(stamp) => !deadlines || stamp > now,
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Stores `value` under `key`.
    ///
    /// Runs a maintenance pass first if one is due, then writes with the
    /// configured default weight.
    pub fn put(&self, key: K, value: V) {
        self.put_arc(key, Arc::new(value));
    }

    /// Stores an already shared value.
    pub fn put_arc(&self, key: K, value: Arc<V>) {
        self.clean_up_if_due();
        let now = Instant::now();
        let stamp = self.write_stamp(now);
        let weight = self.inner.config.default_weight();
        let mut state = self.inner.state.lock();
        state.store.write(key, value, stamp, weight);
    }

    /// Removes `key`, counting one eviction if it was present.
    pub fn invalidate(&self, key: &K) {
        let mut state = self.inner.state.lock();
        if state.store.remove(key).is_some() {
            state.stats.record_evictions(1);
        }
    }

    /// Removes every entry, counting one eviction per entry.
    pub fn invalidate_all(&self) {
        let mut state = self.inner.state.lock();
        let dropped = state.store.remove_all();
        state.stats.record_evictions(dropped as u64);
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    fn clean_up_if_due(&self) {
        let now = Instant::now();
        let due = {
            let state = self.inner.state.lock();
            maintenance_due(
                &self.inner.config,
                state.store.len(),
                state.store.total_weight(),
                state.next_maintenance,
                now,
            )
        };
        if due {
            self.clean_up();
        }
    }

    /// Runs one maintenance pass: the bounded expiry sweep, then at most one
    /// score-selected victim if the cache is still at a bound.
    ///
    /// # Example
    ///
    /// ```
    /// use scorecache::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().max_entries(2).build();
    /// cache.put(1u32, "one");
    /// cache.put(2u32, "two");
    /// let outcome = cache.clean_up();
    /// assert_eq!(outcome.victims, 1);
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn clean_up(&self) -> PassOutcome {
        let config = &self.inner.config;
        let mut state = self.inner.state.lock();
        let now = Instant::now();

        let outcome = run_pass(&mut state.store, config, now);
        state.stats.record_evictions(outcome.removed() as u64);
        if let Some(interval) = config.periodic_maintenance() {
            state.next_maintenance = Some(later(now, interval));
        }

        debug!(
            expired = outcome.expired,
            victims = outcome.victims,
            len = state.store.len(),
            total_weight = state.store.total_weight(),
            "maintenance pass"
        );
        outcome
    }

    // -----------------------------------------------------------------------
    // Per-key overrides
    // -----------------------------------------------------------------------

    /// Sets the stamp of a present key to `expires_at`.
    pub fn set_expires_at(&self, key: &K, expires_at: Instant) -> bool {
        self.inner.state.lock().store.set_stamp(key, expires_at)
    }

    /// Sets the stamp of a present key to `now + expires_in`.
    pub fn set_expires_in(&self, key: &K, expires_in: Duration) -> bool {
        let at = later(Instant::now(), expires_in);
        self.set_expires_at(key, at)
    }

    /// Replaces the weight of a present key; the running total follows.
    pub fn set_weight(&self, key: &K, weight: u64) -> bool {
        self.inner.state.lock().store.set_weight(key, weight)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the weights of stored entries.
    pub fn total_weight(&self) -> u64 {
        self.inner.state.lock().store.total_weight()
    }

    /// Snapshot of all counters, taken in one lock hold.
    pub fn stats(&self) -> CacheStats {
        self.inner.state.lock().stats.snapshot()
    }

    /// `hits / requests`; see [`hit_count`](Self::hit_count) and
    /// [`request_count`](Self::request_count) for the exact ratio.
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    pub fn hit_count(&self) -> u64 {
        self.stats().hits
    }

    pub fn request_count(&self) -> u64 {
        self.stats().requests
    }

    pub fn average_load_penalty(&self) -> Duration {
        self.stats().average_load_penalty
    }

    pub fn eviction_count(&self) -> u64 {
        self.stats().evictions
    }

    #[cfg(test)]
    fn next_maintenance(&self) -> Option<Instant> {
        self.inner.state.lock().next_maintenance
    }

    #[cfg(test)]
    fn debug_validate_invariants(&self) {
        self.inner.state.lock().store.debug_validate_invariants();
    }
}

impl<K, V> ConcurrentCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn get_if_present(&self, key: &K) -> Result<Arc<V>, NotPresent> {
        Cache::get_if_present(self, key)
    }

    fn get_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        Cache::get_with(self, key, loader)
    }

    fn refresh_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        Cache::refresh_with(self, key, loader)
    }

    fn put(&self, key: K, value: V) {
        Cache::put(self, key, value);
    }

    fn invalidate(&self, key: &K) {
        Cache::invalidate(self, key);
    }

    fn invalidate_all(&self) {
        Cache::invalidate_all(self);
    }

    fn clean_up(&self) -> PassOutcome {
        Cache::clean_up(self)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }
}

impl<K, V> ExpiringCache<K> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn set_expires_at(&self, key: &K, expires_at: Instant) -> bool {
        Cache::set_expires_at(self, key, expires_at)
    }

    fn set_expires_in(&self, key: &K, expires_in: Duration) -> bool {
        Cache::set_expires_in(self, key, expires_in)
    }
}

impl<K, V> PriorityCache<K> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn set_weight(&self, key: &K, weight: u64) -> bool {
        Cache::set_weight(self, key, weight)
    }
}

impl<K, V> StatsCache for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn stats(&self) -> CacheStats {
        Cache::stats(self)
    }
}
