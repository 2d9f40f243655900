pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::config::{CacheConfig, TimePolicy};
pub use crate::error::{ConfigError, NotPresent};
pub use crate::loading::{FnLoader, LoadingCache, ValueLoader};
pub use crate::policy::maintenance::PassOutcome;
pub use crate::stats::CacheStats;
pub use crate::traits::{ConcurrentCache, ExpiringCache, PriorityCache, StatsCache};

#[cfg(feature = "concurrency")]
pub use crate::sharded::ShardedCache;

#[cfg(feature = "metrics")]
pub use crate::metrics::{MetricsExporter, PrometheusTextExporter};
