//! Read-through caching of a slow backend with a bound loader.
//!
//! Run with: RUST_LOG=scorecache=debug cargo run --example basic_loading

use std::thread::sleep;
use std::time::Duration;

use scorecache::prelude::*;
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("user {0} not found")]
    NotFound(u32),
}

struct UserDirectory;

impl ValueLoader<u32, String> for UserDirectory {
    type Error = LookupError;

    fn load(&self, id: &u32) -> Result<String, LookupError> {
        sleep(Duration::from_millis(5));
        if *id % 10 == 0 {
            Err(LookupError::NotFound(*id))
        } else {
            Ok(format!("user-{id}"))
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let users = CacheBuilder::new()
        .max_entries(8)
        .expire_after_access(Duration::from_secs(30))
        .periodic_maintenance(Duration::from_secs(5))
        .build_loading(UserDirectory);

    for round in 0..3 {
        for id in 1..=12 {
            match users.get(&id) {
                Ok(name) => info!(round, id, %name, "lookup"),
                Err(err) => info!(round, id, %err, "lookup failed"),
            }
        }
    }

    let stats = users.stats();
    println!("entries:          {}", users.len());
    println!("hit rate:         {:.2}", stats.hit_rate());
    println!("loads / failures: {} / {}", stats.load_count, stats.load_failures);
    println!("avg load penalty: {:?}", stats.average_load_penalty);
    println!("evictions:        {}", stats.evictions);
}
