//! Storage for cache records.

pub mod entry;

pub use entry::{EntryStore, EntryView};
