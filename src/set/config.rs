//! Construction parameters for [`ConcurrentSet`].

use super::concurrent::ConcurrentSet;

/// Default number of shards (always a power of 2)
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Tuning knobs for a [`ConcurrentSet`]
///
/// None of these change the semantics of the set, only how its keys are spread and
/// whether operation metrics are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetConfig {
    /// Number of independently locked shards, rounded up to a power of 2
    pub shard_count: usize,
    /// Expected number of entries, split evenly across shards
    pub capacity: usize,
    /// Whether operation metrics start enabled
    pub metrics_enabled: bool,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            capacity: 0,
            metrics_enabled: true,
        }
    }
}

impl SetConfig {
    /// Shard count after rounding up to the next power of 2 (at least 1)
    pub fn effective_shard_count(&self) -> usize {
        self.shard_count.max(1).next_power_of_two()
    }

    /// Initial capacity reserved in each shard
    pub(crate) fn capacity_per_shard(&self) -> usize {
        self.capacity.div_ceil(self.effective_shard_count())
    }
}

/// Fluent builder for [`ConcurrentSet`]
///
/// # Examples
///
/// ```rust
/// use syncset::SetBuilder;
///
/// let set = SetBuilder::new()
///     .shard_count(4)
///     .capacity(1024)
///     .metrics(false)
///     .build::<u64>();
/// assert_eq!(set.shard_count(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SetBuilder {
    config: SetConfig,
}

impl SetBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.config.shard_count = shard_count;
        self
    }

    /// Set the expected number of entries
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Enable or disable metrics recording
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.config.metrics_enabled = enabled;
        self
    }

    /// The configuration built so far
    pub fn config(&self) -> &SetConfig {
        &self.config
    }

    /// Build an empty set
    pub fn build<V>(self) -> ConcurrentSet<V> {
        ConcurrentSet::with_config(self.config)
    }
}
