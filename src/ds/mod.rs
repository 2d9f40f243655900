pub mod shard;

pub use shard::ShardSelector;
