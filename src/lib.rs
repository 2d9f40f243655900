//! scorecache: an in-process key/value cache with count, weight and time
//! bounds, and composite-score eviction.
//!
//! Entries are evicted by a pass that runs before writes once a bound is
//! reached or a periodic interval elapses. The pass first reclaims expired
//! entries, then, if the cache is still at a bound, removes the entry with the
//! lowest score combining its relative weight and its relative age.
//!
//! ```
//! use std::time::Duration;
//!
//! use scorecache::prelude::*;
//!
//! let cache: Cache<String, Vec<u8>> = CacheBuilder::new()
//!     .max_entries(1_024)
//!     .expire_after_access(Duration::from_secs(30))
//!     .build();
//!
//! let bytes = cache
//!     .get_with(&"logo.png".to_string(), |_| Ok::<_, std::io::Error>(vec![0x89, 0x50]))
//!     .unwrap();
//! assert_eq!(bytes.len(), 2);
//! assert_eq!(cache.hit_count(), 0);
//! assert_eq!(cache.request_count(), 1);
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod ds;
pub mod error;
pub mod loading;
pub mod policy;
pub mod stats;
pub mod store;
pub mod traits;

#[cfg(feature = "concurrency")]
pub mod sharded;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
