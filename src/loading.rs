//! Caches bound to a value loader.
//!
//! A [`LoadingCache`] pairs any [`ConcurrentCache`] with a [`ValueLoader`]
//! so callers read through the cache without passing a closure each time.
//! Loader errors are returned to the caller as the loader's own error type
//! and nothing is cached for them.
//!
//! ```
//! use scorecache::cache::Cache;
//! use scorecache::loading::{FnLoader, LoadingCache};
//!
//! let users = LoadingCache::new(
//!     Cache::with_max_entries(100),
//!     FnLoader::new(|id: &u32| {
//!         if *id == 0 {
//!             Err("no such user")
//!         } else {
//!             Ok(format!("user-{id}"))
//!         }
//!     }),
//! );
//!
//! assert_eq!(users.get(&7).unwrap().as_str(), "user-7");
//! assert_eq!(users.get(&0).unwrap_err(), "no such user");
//! assert_eq!(users.cache().len(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::Cache;
use crate::error::NotPresent;
use crate::policy::maintenance::PassOutcome;
use crate::stats::CacheStats;
use crate::traits::{ConcurrentCache, StatsCache};

/// Produces the value for a key on a cache miss.
pub trait ValueLoader<K, V> {
    type Error;

    fn load(&self, key: &K) -> Result<V, Self::Error>;
}

/// Adapts a closure into a [`ValueLoader`].
pub struct FnLoader<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnLoader<F, E> {
    pub fn new<K, V>(f: F) -> Self
    where
        F: Fn(&K) -> Result<V, E>,
    {
        Self {
            f,
            _error: PhantomData,
        }
    }
}

impl<F: Clone, E> Clone for FnLoader<F, E> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _error: PhantomData,
        }
    }
}

impl<F, E> fmt::Debug for FnLoader<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLoader").finish_non_exhaustive()
    }
}

impl<K, V, E, F> ValueLoader<K, V> for FnLoader<F, E>
where
    F: Fn(&K) -> Result<V, E>,
{
    type Error = E;

    #[inline]
    fn load(&self, key: &K) -> Result<V, E> {
        (self.f)(key)
    }
}

/// A cache that loads missing values through a bound loader.
pub struct LoadingCache<K, V, L, C = Cache<K, V>> {
    cache: C,
    loader: Arc<L>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, L, C: Clone> Clone for LoadingCache<K, V, L, C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            loader: Arc::clone(&self.loader),
            _marker: PhantomData,
        }
    }
}

impl<K, V, L, C: fmt::Debug> fmt::Debug for LoadingCache<K, V, L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingCache")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<K, V, L, C> LoadingCache<K, V, L, C>
where
    C: ConcurrentCache<K, V>,
    L: ValueLoader<K, V>,
{
    pub fn new(cache: C, loader: L) -> Self {
        Self {
            cache,
            loader: Arc::new(loader),
            _marker: PhantomData,
        }
    }

    /// Returns the cached value for `key`, loading it on a miss.
    pub fn get(&self, key: &K) -> Result<Arc<V>, L::Error> {
        self.cache.get_with(key, |k| self.loader.load(k))
    }

    /// Same as [`get`](Self::get).
    #[inline]
    pub fn load(&self, key: &K) -> Result<Arc<V>, L::Error> {
        self.get(key)
    }

    /// Returns the cached value without loading.
    pub fn get_if_present(&self, key: &K) -> Result<Arc<V>, NotPresent> {
        self.cache.get_if_present(key)
    }

    /// Reloads `key` unconditionally and returns the fresh value.
    ///
    /// On failure the previously cached value, if any, stays in place.
    pub fn refresh(&self, key: &K) -> Result<Arc<V>, L::Error> {
        self.cache.refresh_with(key, |k| self.loader.load(k))
    }

    pub fn put(&self, key: K, value: V) {
        self.cache.put(key, value);
    }

    pub fn invalidate(&self, key: &K) {
        self.cache.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn clean_up(&self) -> PassOutcome {
        self.cache.clean_up()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// The underlying cache, for per-key overrides and introspection.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<K, V, F, E> LoadingCache<K, V, FnLoader<F, E>, Cache<K, V>>
where
    Cache<K, V>: ConcurrentCache<K, V>,
    F: Fn(&K) -> Result<V, E>,
{
    /// Binds a closure loader to `cache`.
    pub fn from_fn(cache: Cache<K, V>, f: F) -> Self {
        Self::new(cache, FnLoader::new(f))
    }
}

impl<K, V, L, C> StatsCache for LoadingCache<K, V, L, C>
where
    C: StatsCache,
{
    fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
