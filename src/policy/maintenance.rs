//! Maintenance trigger and the maintenance pass.
//!
//! ## Trigger
//!
//! Checked before every write. Maintenance is due when any of:
//!
//! - a periodic interval is configured and `now >= next_maintenance`;
//! - `max_entries` is configured and `len >= max_entries`;
//! - `max_weight` is configured and `total_weight >= max_weight`.
//!
//! ## Pass
//!
//! ```text
//!   1. Expiry sweep (only when stamps are deadlines)
//!        bounded cache   → evict the first expired entry found, stop
//!        unbounded cache → evict every expired entry
//!
//!   2. Victim selection (only when the sweep evicted nothing and the cache
//!      is still at or over a bound)
//!        running-candidate scan with the composite score, evict one
//! ```
//!
//! Rescheduling the next periodic pass is left to the caller, which owns the
//! schedule.

use std::hash::Hash;
use std::time::Instant;

use tracing::trace;

use crate::config::CacheConfig;
use crate::policy::scoring::{AgeBasis, Candidate, select_victim};
use crate::store::entry::EntryStore;

/// Summary of one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Entries removed by the expiry sweep.
    pub expired: usize,
    /// Entries removed by score selection. One per pass on a single cache;
    /// summed across shards by a sharded cache.
    pub victims: usize,
}

impl PassOutcome {
    /// Total entries removed by the pass.
    #[inline]
    pub fn removed(&self) -> usize {
        self.expired + self.victims
    }
}

/// Returns `true` if a maintenance pass should run before the next write.
#[inline]
pub fn maintenance_due(
    config: &CacheConfig,
    len: usize,
    total_weight: u64,
    next_maintenance: Option<Instant>,
    now: Instant,
) -> bool {
    let periodic = config.periodic_maintenance().is_some()
        && next_maintenance.is_some_and(|next| next <= now);
    periodic || config.under_pressure(len, total_weight)
}

/// Runs one maintenance pass over `store`.
pub fn run_pass<K, V>(store: &mut EntryStore<K, V>, config: &CacheConfig, now: Instant) -> PassOutcome
where
    K: Eq + Hash + Clone,
{
    let mut outcome = PassOutcome::default();
    let deadlines = config.time_policy().is_deadline();

    if deadlines {
        let expired: Vec<K> = if config.is_bounded() {
            store
                .iter()
                .find(|entry| entry.stamp <= now)
                .map(|entry| entry.key.clone())
                .into_iter()
                .collect()
        } else {
            store
                .iter()
                .filter(|entry| entry.stamp <= now)
                .map(|entry| entry.key.clone())
                .collect()
        };
        for key in &expired {
            if store.remove(key).is_some() {
                outcome.expired += 1;
            }
        }
        if outcome.expired > 0 {
            trace!(count = outcome.expired, "swept expired entries");
        }
    }

    if outcome.expired == 0 && config.under_pressure(store.len(), store.total_weight()) {
        let basis = if deadlines {
            AgeBasis::Deadline
        } else {
            AgeBasis::Elapsed
        };
        let victim = select_victim(
            store.iter().map(|entry| {
                (
                    entry.key,
                    Candidate {
                        weight: entry.weight,
                        stamp: entry.stamp,
                    },
                )
            }),
            basis,
            now,
        )
        .cloned();

        if let Some(key) = victim {
            if store.remove(&key).is_some() {
                outcome.victims = 1;
            }
            trace!(?basis, "evicted score-selected victim");
        }
    }

    outcome
}
