//! Concurrent Set Implementation
//!
//! This module implements a keyed set whose key space is split across a power-of-2 number
//! of shards, each guarded by its own reader-writer lock.
//!
//! ## Design
//!
//! The set uses:
//! - Key accessors that are evaluated once per call, before any lock is taken
//! - FxHash of the derived key to pick a shard
//! - One shard lock for every single-key operation, so `add` and `pop` are check-then-act atomic
//! - All shard locks, always taken in ascending shard order, for `clear`, `iterator` and `clone`
//!
//! ## Memory Ordering
//!
//! The entry counter is only modified while the shard lock covering the entry is held, and
//! `clear` resets it while holding every shard lock, so it never underflows.
//!
//! ## Performance Characteristics
//!
//! - **Add / Pop / Peek**: O(1) average case, blocks only on contention for the same shard
//! - **Count**: O(1), lock-free
//! - **Clear / Iterator**: O(n), holds every shard lock for the duration
//!
//! ## Example
//!
//! ```rust
//! use syncset::ConcurrentSet;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let set = Arc::new(ConcurrentSet::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || set.add(|| "leader", i).is_ok())
//!     })
//!     .collect();
//!
//! let winners = handles
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .filter(|won| *won)
//!     .count();
//! assert_eq!(winners, 1);
//! assert_eq!(set.count(), 1);
//! ```

use super::config::SetConfig;
use super::iter::SnapshotIter;
use crate::metrics::{AtomicMetrics, MetricsCollector, PerformanceMetrics};
use crate::util::CachePadded;
use crate::{Error, Result};
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use fxhash::{FxBuildHasher, FxHasher};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::time::Instant;

type Entries<V> = HashMap<String, V, FxBuildHasher>;

/// Computes the string identity of an item on demand
///
/// Implemented for every closure returning something convertible into a `String`, so both
/// `|| "fixed"` and `move || item.id.to_string()` work. Accessors should be pure: the set
/// evaluates one exactly once per operation, outside of any lock.
pub trait KeyAccessor {
    /// Derive the key
    fn derive_key(&self) -> String;
}

impl<F, S> KeyAccessor for F
where
    F: Fn() -> S,
    S: Into<String>,
{
    fn derive_key(&self) -> String {
        (self)().into()
    }
}

/// A thread-safe set of values addressed by derived string keys
///
/// # Type Parameters
///
/// * `V` - The value type. The set is `Sync` when `V: Send + Sync`.
///
/// # Examples
///
/// ```rust
/// use syncset::{ConcurrentSet, Error};
///
/// let set: ConcurrentSet<String> = ConcurrentSet::new();
/// set.add(|| "a", "first".to_string())?;
///
/// let err = set.add(|| "a", "second".to_string()).unwrap_err();
/// assert!(matches!(err, Error::AlreadyExists { .. }));
/// assert_eq!(set.peek(|| "a")?, "first");
/// # Ok::<(), syncset::Error>(())
/// ```
pub struct ConcurrentSet<V> {
    shards: Box<[CachePadded<RwLock<Entries<V>>>]>,

    // shards.len() - 1
    mask: usize,

    // Only modified under the lock of the shard holding the entry
    size: CachePadded<AtomicUsize>,

    metrics: AtomicMetrics,
    metrics_enabled: AtomicBool,
}

impl<V> ConcurrentSet<V> {
    /// Create an empty set with the default configuration
    pub fn new() -> Self {
        Self::with_config(SetConfig::default())
    }

    /// Create an empty set with room for `capacity` entries
    ///
    /// # Examples
    ///
    /// ```rust
    /// use syncset::ConcurrentSet;
    ///
    /// let set: ConcurrentSet<u32> = ConcurrentSet::with_capacity(256);
    /// assert_eq!(set.count(), 0);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(SetConfig {
            capacity,
            ..SetConfig::default()
        })
    }

    /// Create an empty set from an explicit configuration
    ///
    /// The shard count is rounded up to the next power of 2.
    pub fn with_config(config: SetConfig) -> Self {
        let shard_count = config.effective_shard_count();
        let per_shard = config.capacity_per_shard();

        let shards = (0..shard_count)
            .map(|_| {
                CachePadded::new(RwLock::new(HashMap::with_capacity_and_hasher(
                    per_shard,
                    FxBuildHasher::default(),
                )))
            })
            .collect();

        Self {
            shards,
            mask: shard_count - 1,
            size: CachePadded::new(AtomicUsize::new(0)),
            metrics: AtomicMetrics::default(),
            metrics_enabled: AtomicBool::new(config.metrics_enabled),
        }
    }

    /// Number of shards the key space is split into
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Insert `value` under the derived key if no entry holds that key yet
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyExists`] when the key is present. The set is left unchanged and
    /// `value` is dropped.
    pub fn add<K: KeyAccessor>(&self, key: K, value: V) -> Result<()> {
        let start = self.start_timer();
        let key = key.derive_key();

        let mut shard = self.write_shard(&key);
        if shard.contains_key(&key) {
            drop(shard);
            event!(debug, key = %key, "add rejected: key already present");
            self.record_failure(start);
            return Err(Error::AlreadyExists { key });
        }

        event!(trace, key = %key, "entry added");
        shard.insert(key, value);
        let entries = self.size.get().fetch_add(1, Ordering::Relaxed) + 1;
        drop(shard);

        if let Some(start) = start {
            self.metrics.record_success(start.elapsed());
            self.metrics.update_peak_entries(entries);
        }
        Ok(())
    }

    /// Clone the value stored under the derived key
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when the key is absent.
    pub fn peek<K: KeyAccessor>(&self, key: K) -> Result<V>
    where
        V: Clone,
    {
        self.peek_with(key, V::clone)
    }

    /// Run `f` on the value stored under the derived key without cloning it
    ///
    /// `f` runs while the key's shard is read-locked, so it must not call back into this set.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use syncset::ConcurrentSet;
    ///
    /// let set = ConcurrentSet::new();
    /// set.add(|| "buf", vec![0u8; 32])?;
    /// assert_eq!(set.peek_with(|| "buf", |buf| buf.len())?, 32);
    /// # Ok::<(), syncset::Error>(())
    /// ```
    pub fn peek_with<K, F, R>(&self, key: K, f: F) -> Result<R>
    where
        K: KeyAccessor,
        F: FnOnce(&V) -> R,
    {
        let start = self.start_timer();
        let key = key.derive_key();

        let out = {
            let shard = self.read_shard(&key);
            shard.get(&key).map(f)
        };

        match out {
            Some(out) => {
                self.record_success(start);
                Ok(out)
            }
            None => {
                event!(debug, key = %key, "peek missed");
                self.record_failure(start);
                Err(Error::KeyNotFound { key })
            }
        }
    }

    /// Check whether an entry holds the derived key
    ///
    /// A presence check, not a lookup: it is not counted in [`MetricsCollector::metrics`].
    pub fn contains<K: KeyAccessor>(&self, key: K) -> bool {
        let key = key.derive_key();
        self.read_shard(&key).contains_key(&key)
    }

    /// Remove the entry under the derived key and return its value
    ///
    /// Of several callers popping the same entry concurrently, exactly one receives it.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when the key is absent.
    pub fn pop<K: KeyAccessor>(&self, key: K) -> Result<V> {
        let start = self.start_timer();
        let key = key.derive_key();

        let removed = {
            let mut shard = self.write_shard(&key);
            let removed = shard.remove(&key);
            if removed.is_some() {
                self.size.get().fetch_sub(1, Ordering::Relaxed);
            }
            removed
        };

        match removed {
            Some(value) => {
                event!(trace, key = %key, "entry popped");
                self.record_success(start);
                Ok(value)
            }
            None => {
                event!(debug, key = %key, "pop missed");
                self.record_failure(start);
                Err(Error::KeyNotFound { key })
            }
        }
    }

    /// Number of entries
    ///
    /// The value may be stale by the time the caller looks at it if other threads are
    /// mutating the set.
    pub fn count(&self) -> usize {
        self.size.get().load(Ordering::Acquire)
    }

    /// Check if the set has no entries
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Discard every entry
    ///
    /// All shards are emptied under their write locks at once, so no caller observes a
    /// partially cleared set. The removed values are dropped after the locks are released.
    pub fn clear(&self) {
        let mut guards = self.write_all();
        let discarded: Vec<Entries<V>> = guards
            .iter_mut()
            .map(|shard| core::mem::take(&mut **shard))
            .collect();
        self.size.get().store(0, Ordering::Release);
        drop(guards);

        event!(
            debug,
            discarded = discarded.iter().map(HashMap::len).sum::<usize>(),
            "set cleared"
        );
        drop(discarded);
    }

    /// Take a snapshot of every value and return a producer over it
    ///
    /// The snapshot is frozen: later mutation of the set does not affect it. Order is
    /// unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use syncset::ConcurrentSet;
    ///
    /// let set = ConcurrentSet::new();
    /// set.add(|| "one", 1)?;
    /// set.add(|| "two", 2)?;
    ///
    /// let mut iter = set.iterator();
    /// set.clear();
    ///
    /// let mut seen = Vec::new();
    /// loop {
    ///     let (item, last) = iter.next_item();
    ///     seen.extend(item);
    ///     if last {
    ///         break;
    ///     }
    /// }
    /// seen.sort();
    /// assert_eq!(seen, vec![1, 2]);
    /// # Ok::<(), syncset::Error>(())
    /// ```
    pub fn iterator(&self) -> SnapshotIter<V>
    where
        V: Clone,
    {
        let guards = self.read_all();
        let mut items = Vec::with_capacity(guards.iter().map(|shard| shard.len()).sum());
        for shard in &guards {
            items.extend(shard.values().cloned());
        }
        drop(guards);

        SnapshotIter::new(items)
    }

    // Private helper methods

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        ((hasher.finish() >> 32) as usize) & self.mask
    }

    fn read_shard(&self, key: &str) -> RwLockReadGuard<'_, Entries<V>> {
        let lock = self.shards[self.shard_index(key)].get();
        match lock.try_read() {
            Some(guard) => guard,
            None => {
                self.record_contention();
                lock.read()
            }
        }
    }

    fn write_shard(&self, key: &str) -> RwLockWriteGuard<'_, Entries<V>> {
        let lock = self.shards[self.shard_index(key)].get();
        match lock.try_write() {
            Some(guard) => guard,
            None => {
                self.record_contention();
                lock.write()
            }
        }
    }

    // Ascending shard order for both, which keeps multi-shard locking deadlock free.

    fn read_all(&self) -> Vec<RwLockReadGuard<'_, Entries<V>>> {
        self.shards.iter().map(|shard| shard.get().read()).collect()
    }

    fn write_all(&self) -> Vec<RwLockWriteGuard<'_, Entries<V>>> {
        self.shards.iter().map(|shard| shard.get().write()).collect()
    }

    fn start_timer(&self) -> Option<Instant> {
        self.is_metrics_enabled().then(Instant::now)
    }

    fn record_success(&self, start: Option<Instant>) {
        if let Some(start) = start {
            self.metrics.record_success(start.elapsed());
        }
    }

    fn record_failure(&self, start: Option<Instant>) {
        if let Some(start) = start {
            self.metrics.record_failure(start.elapsed());
        }
    }

    fn record_contention(&self) {
        if self.is_metrics_enabled() {
            self.metrics.record_contention();
        }
    }
}

impl<V> Default for ConcurrentSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for ConcurrentSet<V> {
    fn clone(&self) -> Self {
        let guards = self.read_all();
        let shards = guards
            .iter()
            .map(|shard| CachePadded::new(RwLock::new((**shard).clone())))
            .collect();
        let size = guards.iter().map(|shard| shard.len()).sum();
        drop(guards);

        Self {
            shards,
            mask: self.mask,
            size: CachePadded::new(AtomicUsize::new(size)),
            metrics: AtomicMetrics::default(),
            metrics_enabled: AtomicBool::new(self.is_metrics_enabled()),
        }
    }
}

impl<V> core::fmt::Debug for ConcurrentSet<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentSet")
            .field("shards", &self.shard_count())
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

impl<V> MetricsCollector for ConcurrentSet<V> {
    fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }
}
