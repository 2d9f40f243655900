//! Eviction policy: when a maintenance pass runs, and which entry it removes.

pub mod maintenance;
pub mod scoring;
