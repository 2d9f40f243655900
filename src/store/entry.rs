//! Per-key record store with a running weight total.
//!
//! ## Architecture
//!
//! ```text
//!   map: FxHashMap<K, Entry<V>>
//!
//!   ┌──────────┬──────────────────────────────────────┐
//!   │   Key    │  Entry { value, stamp, weight }      │
//!   ├──────────┼──────────────────────────────────────┤
//!   │  "a"     │  Arc<V>,  Instant,  1                │
//!   │  "b"     │  Arc<V>,  Instant,  4                │
//!   └──────────┴──────────────────────────────────────┘
//!
//!   total_weight = Σ entry.weight
//! ```
//!
//! Value, stamp and weight of a key live in one record, so they are always
//! inserted and removed together. The store holds data only: what a stamp
//! means (write time, write deadline, access deadline) is decided by the
//! cache that owns it, and no bound is enforced here.
//!
//! ## Thread Safety
//!
//! `EntryStore` is single-threaded; [`Cache`](crate::cache::Cache) guards it
//! with one `parking_lot::Mutex`.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    stamp: Instant,
    weight: u64,
}

/// Borrowed view of one record, yielded by [`EntryStore::iter`].
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a, K> {
    pub key: &'a K,
    pub stamp: Instant,
    pub weight: u64,
}

/// HashMap-backed store that keeps value, timestamp and weight per key and
/// tracks the total weight of live entries.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    map: FxHashMap<K, Entry<V>>,
    total_weight: u64,
}

impl<K, V> Default for EntryStore<K, V> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
            total_weight: 0,
        }
    }
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a record. Returns the previous value if the key existed.
    pub fn write(&mut self, key: K, value: Arc<V>, stamp: Instant, weight: u64) -> Option<Arc<V>> {
        let previous = self.map.insert(
            key,
            Entry {
                value,
                stamp,
                weight,
            },
        );
        self.total_weight = self.total_weight.saturating_add(weight);
        previous.map(|old| {
            self.total_weight = self.total_weight.saturating_sub(old.weight);
            old.value
        })
    }

    /// Looks a value up without side effects.
    #[inline]
    pub fn read_raw(&self, key: &K) -> Option<&Arc<V>> {
        self.map.get(key).map(|entry| &entry.value)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    pub fn stamp(&self, key: &K) -> Option<Instant> {
        self.map.get(key).map(|entry| entry.stamp)
    }

    #[inline]
    pub fn weight(&self, key: &K) -> Option<u64> {
        self.map.get(key).map(|entry| entry.weight)
    }

    /// Replaces the stamp of a present key. Returns `false` if absent.
    pub fn set_stamp(&mut self, key: &K, stamp: Instant) -> bool {
        match self.map.get_mut(key) {
            Some(entry) => {
                entry.stamp = stamp;
                true
            },
            None => false,
        }
    }

    /// Replaces the weight of a present key, keeping the total in step.
    /// Returns `false` if absent.
    pub fn set_weight(&mut self, key: &K, weight: u64) -> bool {
        match self.map.get_mut(key) {
            Some(entry) => {
                self.total_weight = self
                    .total_weight
                    .saturating_sub(entry.weight)
                    .saturating_add(weight);
                entry.weight = weight;
                true
            },
            None => false,
        }
    }

    /// Removes a record, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let entry = self.map.remove(key)?;
        self.total_weight = self.total_weight.saturating_sub(entry.weight);
        Some(entry.value)
    }

    /// Drops every record. Returns how many were dropped.
    pub fn remove_all(&mut self) -> usize {
        let dropped = self.map.len();
        self.map.clear();
        self.total_weight = 0;
        dropped
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of the weights of all live records.
    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Iterates over records in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = EntryView<'_, K>> {
        self.map.iter().map(|(key, entry)| EntryView {
            key,
            stamp: entry.stamp,
            weight: entry.weight,
        })
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let sum: u64 = self.map.values().map(|entry| entry.weight).sum();
        assert_eq!(sum, self.total_weight, "total_weight drifted from records");
    }
}
