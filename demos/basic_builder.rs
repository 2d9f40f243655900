//! Walks through the builder options and shows which entry each bound evicts.
//!
//! Run with: RUST_LOG=scorecache=trace cargo run --example basic_builder

use std::thread::sleep;
use std::time::Duration;

use scorecache::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== CacheBuilder Examples ===\n");

    // Example 1: entry bound, no expiry
    println!("1. Entry bound (max 3)");
    let cache = CacheBuilder::new().max_entries(3).build::<u64, String>();
    for key in 1..=3 {
        cache.put(key, format!("v{key}"));
        sleep(Duration::from_millis(2));
    }

    // Reading key 1 refreshes its stamp, so key 2 is now the oldest
    let _ = cache.get_if_present(&1);
    cache.put(4, "v4".to_string());

    println!("   contains 1? {} (read recently)", cache.contains(&1));
    println!("   contains 2? {} (oldest, evicted)", cache.contains(&2));
    println!("   contains 4? {} (just inserted)", cache.contains(&4));
    println!();

    // Example 2: weight bound
    println!("2. Weight bound (max 10)");
    let cache = CacheBuilder::new()
        .max_weight(10)
        .expire_after_write(Duration::from_secs(60))
        .build::<&str, Vec<u8>>();
    cache.put("thumbnail", vec![0; 4]);
    cache.put("original", vec![0; 64]);
    cache.set_weight(&"thumbnail", 1);
    cache.set_weight(&"original", 9);
    cache.put("preview", vec![0; 16]);

    println!("   contains original?  {} (heavy)", cache.contains(&"original"));
    println!("   contains thumbnail? {} (light, evicted)", cache.contains(&"thumbnail"));
    println!("   total weight: {}", cache.total_weight());
    println!();

    // Example 3: access expiry
    println!("3. Expire 50ms after access");
    let cache = CacheBuilder::new()
        .expire_after_access(Duration::from_millis(50))
        .build::<&str, u32>();
    cache.put("session", 7);
    sleep(Duration::from_millis(30));
    println!("   after 30ms: {:?}", cache.get_if_present(&"session").ok());
    sleep(Duration::from_millis(30));
    println!("   30ms later (read refreshed it): {:?}", cache.get_if_present(&"session").ok());
    sleep(Duration::from_millis(80));
    println!("   80ms of silence: {:?}", cache.get_if_present(&"session").ok());
    println!();

    // Example 4: invalid configuration
    println!("4. Validation");
    match CacheBuilder::new().max_entries(0).try_build::<u64, u64>() {
        Ok(_) => println!("   unexpectedly accepted"),
        Err(err) => println!("   rejected: {err}"),
    }

    println!("\n   stats of last cache: {:?}", cache.stats());
}
