// ==============================================
// CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Shared-handle behavior under real threads: bounds, counters and loader
// calls must stay consistent when many callers hit one cache at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use scorecache::prelude::*;

const THREADS: usize = 8;

// ==============================================
// Bounds Under Contention
// ==============================================

mod bounds {
    use super::*;

    #[test]
    fn concurrent_puts_respect_entry_bound() {
        let cache: Cache<usize, usize> = Cache::with_max_entries(32);
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..1_000 {
                        cache.put(t * 10_000 + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Each write passes the trigger before inserting, so racing writers
        // can overshoot by at most one entry each.
        assert!(cache.len() <= 32 + THREADS, "len = {}", cache.len());
        let inserted = (THREADS * 1_000) as u64;
        assert_eq!(cache.eviction_count(), inserted - cache.len() as u64);
    }

    #[test]
    fn concurrent_weight_overrides_keep_total_consistent() {
        let cache: Cache<usize, ()> = Cache::new();
        for key in 0..256 {
            cache.put(key, ());
        }
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for key in (t..256).step_by(THREADS) {
                        assert!(cache.set_weight(&key, 4));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.total_weight(), 256 * 4);
    }
}

// ==============================================
// Statistics Under Contention
// ==============================================

mod statistics {
    use super::*;

    #[test]
    fn request_count_matches_reads_issued() {
        let cache: Cache<u32, u32> = Cache::new();
        for key in 0..10 {
            cache.put(key, key);
        }
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for key in 0..20 {
                        let _ = cache.get_if_present(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.requests, (THREADS * 20) as u64);
        assert_eq!(stats.hits, (THREADS * 10) as u64);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn racing_invalidates_count_each_key_once() {
        let cache: Cache<u32, u32> = Cache::new();
        for key in 0..100 {
            cache.put(key, key);
        }
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for key in 0..100 {
                        cache.invalidate(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.is_empty());
        assert_eq!(cache.eviction_count(), 100);
    }
}

// ==============================================
// Loader Outside the Lock
// ==============================================

mod loading {
    use super::*;

    #[test]
    fn slow_loader_does_not_block_other_keys() {
        let cache: Cache<&'static str, u32> = Cache::new();
        cache.put("hot", 1);
        let barrier = Arc::new(Barrier::new(2));

        let slow = {
            let cache = cache.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                cache
                    .get_with(&"cold", |_| {
                        barrier.wait();
                        thread::sleep(Duration::from_millis(200));
                        Ok::<_, ()>(2)
                    })
                    .unwrap()
            })
        };

        // Reached while the loader is sleeping.
        barrier.wait();
        let start = std::time::Instant::now();
        assert_eq!(*cache.get_if_present(&"hot").unwrap(), 1);
        assert!(start.elapsed() < Duration::from_millis(150));

        assert_eq!(*slow.join().unwrap(), 2);
        assert_eq!(*cache.get_if_present(&"cold").unwrap(), 2);
    }

    #[test]
    fn loading_cache_shared_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let cache = LoadingCache::from_fn(Cache::with_max_entries(1_000), move |k: &u64| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(k * k)
        });
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for key in 0..50u64 {
                        assert_eq!(*cache.get(&key).unwrap(), key * key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Concurrent misses may each load; every key loads at least once.
        let loads = calls.load(Ordering::SeqCst);
        assert!((50..=50 * THREADS).contains(&loads));
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.stats().load_count, loads as u64);
    }
}

// ==============================================
// Sharded Cache
// ==============================================

#[cfg(feature = "concurrency")]
mod sharded {
    use super::*;

    #[test]
    fn sharded_cache_aggregates_stats() {
        let cache: ShardedCache<usize, usize> = CacheBuilder::new()
            .max_entries(64)
            .build_sharded(4);
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..500 {
                        let key = t * 1_000 + i;
                        cache.put(key, i);
                        let _ = cache.get_if_present(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.requests, (THREADS * 500) as u64);
        // 4 shards of 16, each may overshoot by one per racing writer.
        assert!(cache.len() <= 64 + 4 * THREADS);
        assert_eq!(
            stats.evictions,
            (THREADS * 500) as u64 - cache.len() as u64
        );
    }
}
