//! # Metrics Traits
//!
//! Reading and publishing are kept apart: a cache hands out snapshots, an
//! exporter publishes them.
//!
//! ```text
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │───►│ MetricsExporter<S>           │
//!   │ snapshot() → S               │    │ export(&S)                   │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Every [`StatsCache`] is a snapshot provider for [`CacheStats`].

use crate::stats::CacheStats;
use crate::traits::StatsCache;

/// Produces a point-in-time snapshot of type `S`.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes snapshots of type `S` to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}

impl<T: StatsCache> MetricsSnapshotProvider<CacheStats> for T {
    fn snapshot(&self) -> CacheStats {
        self.stats()
    }
}
