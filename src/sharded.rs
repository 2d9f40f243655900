//! Lock-sharded cache.
//!
//! `ShardedCache` splits the key space across N independent [`Cache`]
//! instances, each behind its own lock, selected by [`ShardSelector`].
//!
//! ```text
//!   ShardedCache
//!     ├── selector: ShardSelector
//!     └── shards: Arc<[Cache<K, V>]>
//!           ├── Cache (max_entries = ceil(max / n))
//!           ├── Cache
//!           └── ...
//! ```
//!
//! Bounds are enforced per shard, so the whole cache can hold up to
//! `n * ceil(max / n)` entries and victims are chosen within one shard.
//! Statistics are folded across shards with [`CacheStats::combine`].

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::ds::ShardSelector;
use crate::error::{ConfigError, NotPresent};
use crate::policy::maintenance::PassOutcome;
use crate::stats::CacheStats;
use crate::traits::{ConcurrentCache, ExpiringCache, PriorityCache, StatsCache};

const SHARD_SEED: u64 = 0x5eed_cac4e;

/// A cache partitioned across independently locked shards.
pub struct ShardedCache<K, V> {
    selector: ShardSelector,
    shards: Arc<[Cache<K, V>]>,
    config: CacheConfig,
}

impl<K, V> Clone for ShardedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            selector: self.selector,
            shards: Arc::clone(&self.shards),
            config: self.config.clone(),
        }
    }
}

impl<K, V> fmt::Debug for ShardedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.selector.shard_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<K, V> ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Builds `shards` caches from a validated `config`.
    pub(crate) fn from_config(config: CacheConfig, shards: usize) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shards must be > 0"));
        }
        let mut per_shard = config.clone();
        per_shard.max_entries = config.max_entries.map(|max| max.div_ceil(shards));
        per_shard.max_weight = config.max_weight.map(|max| max.div_ceil(shards as u64));

        let caches: Vec<Cache<K, V>> = (0..shards)
            .map(|_| Cache::from_config(per_shard.clone()))
            .collect();
        Ok(Self {
            selector: ShardSelector::new(shards, SHARD_SEED),
            shards: caches.into(),
            config,
        })
    }

    #[inline]
    fn shard(&self, key: &K) -> &Cache<K, V> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The configuration the cache was built with, before splitting.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).contains(key)
    }

    pub fn total_weight(&self) -> u64 {
        self.shards.iter().map(Cache::total_weight).sum()
    }

    /// Per-shard statistics, indexed by shard.
    pub fn shard_stats(&self) -> Vec<CacheStats> {
        self.shards.iter().map(Cache::stats).collect()
    }
}

impl<K, V> ConcurrentCache<K, V> for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn get_if_present(&self, key: &K) -> Result<Arc<V>, NotPresent> {
        self.shard(key).get_if_present(key)
    }

    fn get_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.shard(key).get_with(key, loader)
    }

    fn refresh_with<E, F>(&self, key: &K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.shard(key).refresh_with(key, loader)
    }

    fn put(&self, key: K, value: V) {
        self.shard(&key).put(key, value);
    }

    fn invalidate(&self, key: &K) {
        self.shard(key).invalidate(key);
    }

    fn invalidate_all(&self) {
        for shard in self.shards.iter() {
            shard.invalidate_all();
        }
    }

    /// Runs one pass on every shard and sums the outcomes, so `victims` can
    /// exceed one.
    fn clean_up(&self) -> PassOutcome {
        self.shards
            .iter()
            .map(Cache::clean_up)
            .fold(PassOutcome::default(), |acc, pass| PassOutcome {
                expired: acc.expired + pass.expired,
                victims: acc.victims + pass.victims,
            })
    }

    fn len(&self) -> usize {
        self.shards.iter().map(Cache::len).sum()
    }
}

impl<K, V> ExpiringCache<K> for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn set_expires_at(&self, key: &K, expires_at: Instant) -> bool {
        self.shard(key).set_expires_at(key, expires_at)
    }

    fn set_expires_in(&self, key: &K, expires_in: Duration) -> bool {
        self.shard(key).set_expires_in(key, expires_in)
    }
}

impl<K, V> PriorityCache<K> for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn set_weight(&self, key: &K, weight: u64) -> bool {
        self.shard(key).set_weight(key, weight)
    }
}

impl<K, V> StatsCache for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    fn stats(&self) -> CacheStats {
        CacheStats::combine(self.shards.iter().map(Cache::stats))
    }
}
