//! Builder for configuring caches.
//!
//! Every option is optional. Zero values are rejected by
//! [`try_build`](CacheBuilder::try_build); [`build`](CacheBuilder::build)
//! panics with the same message.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use scorecache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .max_entries(100)
//!     .expire_after_write(Duration::from_secs(30))
//!     .build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get_if_present(&1).as_deref(), Ok(&"hello".to_string()));
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::ConfigError;
use crate::loading::{LoadingCache, ValueLoader};
#[cfg(feature = "concurrency")]
use crate::sharded::ShardedCache;

/// Builder for creating cache instances.
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a builder with every bound unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Bound the aggregate weight of all entries.
    pub fn max_weight(mut self, max_weight: u64) -> Self {
        self.config.max_weight = Some(max_weight);
        self
    }

    /// Expire entries a fixed duration after they were written.
    ///
    /// Takes priority over [`expire_after_access`](Self::expire_after_access).
    pub fn expire_after_write(mut self, duration: Duration) -> Self {
        self.config.expire_after_write = Some(duration);
        self
    }

    /// Expire entries a fixed duration after they were last read or written.
    pub fn expire_after_access(mut self, duration: Duration) -> Self {
        self.config.expire_after_access = Some(duration);
        self
    }

    /// Run maintenance on the next write at least once per `interval`.
    pub fn periodic_maintenance(mut self, interval: Duration) -> Self {
        self.config.periodic_maintenance = Some(interval);
        self
    }

    /// Weight assigned to every written entry. Defaults to 1.
    pub fn default_weight(mut self, weight: u64) -> Self {
        self.config.default_weight = weight;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Validate the configuration and build a cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any configured bound or duration is zero.
    pub fn try_build<K, V>(self) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
    {
        self.config.validate()?;
        Ok(Cache::from_config(self.config))
    }

    /// Build a cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; see [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> Cache<K, V>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }

    /// Build a cache bound to `loader`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scorecache::builder::CacheBuilder;
    /// use scorecache::loading::FnLoader;
    ///
    /// let cache = CacheBuilder::new()
    ///     .max_entries(16)
    ///     .try_build_loading(FnLoader::new(|k: &u32| Ok::<_, String>(k * 2)))
    ///     .unwrap();
    /// assert_eq!(*cache.get(&21).unwrap(), 42);
    /// ```
    pub fn try_build_loading<K, V, L>(self, loader: L) -> Result<LoadingCache<K, V, L>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
        L: ValueLoader<K, V>,
    {
        Ok(LoadingCache::new(self.try_build()?, loader))
    }

    /// Build a cache bound to `loader`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build_loading<K, V, L>(self, loader: L) -> LoadingCache<K, V, L>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
        L: ValueLoader<K, V>,
    {
        LoadingCache::new(self.build(), loader)
    }

    /// Build a cache split across `shards` independently locked partitions.
    ///
    /// Entry and weight bounds are divided across shards, rounding up.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or `shards` is
    /// zero.
    #[cfg(feature = "concurrency")]
    pub fn try_build_sharded<K, V>(self, shards: usize) -> Result<ShardedCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
    {
        self.config.validate()?;
        ShardedCache::from_config(self.config, shards)
    }

    /// Build a sharded cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid or `shards` is zero.
    #[cfg(feature = "concurrency")]
    pub fn build_sharded<K, V>(self, shards: usize) -> ShardedCache<K, V>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Send + Sync,
    {
        match self.try_build_sharded(shards) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }
}
