//! Set implementations
//!
//! This module provides the sharded [`ConcurrentSet`] and its supporting types.
//!
//! ## Available Types
//!
//! - [`ConcurrentSet`]: thread-safe keyed set with check-then-act `add` and `pop`
//! - [`SnapshotIter`]: single-pass producer over a frozen copy of a set
//! - [`SetConfig`] / [`SetBuilder`]: shard count, capacity hint and metrics toggle
//!
//! ## Choosing a Shard Count
//!
//! - The default of 16 shards suits most workloads
//! - A single shard turns the set into one globally locked map, which is simplest to reason about
//! - Raise the shard count when many threads hammer distinct keys and metrics report contention

pub mod concurrent;
pub mod config;
pub mod iter;

pub use self::concurrent::{ConcurrentSet, KeyAccessor};
pub use self::config::{SetBuilder, SetConfig, DEFAULT_SHARD_COUNT};
pub use self::iter::SnapshotIter;


#[cfg(test)]
mod proptests;
