//! Snapshot iteration
//!
//! [`SnapshotIter`] owns a copy of the values present when
//! [`ConcurrentSet::iterator`](super::ConcurrentSet::iterator) was called. It never touches the
//! live set again, so later `add`, `pop` or `clear` calls cannot affect it.

use core::iter::FusedIterator;
use std::vec::IntoIter;

/// A single-pass producer over a frozen copy of a set's values
///
/// Values come out in arbitrary order, each exactly once.
///
/// # Examples
///
/// ```rust
/// use syncset::ConcurrentSet;
///
/// let set = ConcurrentSet::new();
/// set.add(|| "a", 1)?;
///
/// let mut iter = set.iterator();
/// assert_eq!(iter.next_item(), (Some(1), true));
/// assert_eq!(iter.next_item(), (None, true));
/// # Ok::<(), syncset::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotIter<V> {
    items: IntoIter<V>,
}

impl<V> SnapshotIter<V> {
    pub(crate) fn new(items: Vec<V>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }

    /// Produce the next value along with a flag telling whether it was the last one
    ///
    /// The flag is `true` together with the final value. An empty snapshot reports
    /// `(None, true)` on the first call, and an exhausted one keeps reporting `(None, true)`.
    pub fn next_item(&mut self) -> (Option<V>, bool) {
        let item = self.items.next();
        (item, self.items.len() == 0)
    }

    /// Number of values not yet produced
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Turn the snapshot into a stateful closure with the same contract as [`next_item`]
    ///
    /// [`next_item`]: SnapshotIter::next_item
    pub fn into_producer(mut self) -> impl FnMut() -> (Option<V>, bool) {
        move || self.next_item()
    }
}

impl<V> Iterator for SnapshotIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<V> ExactSizeIterator for SnapshotIter<V> {}

impl<V> FusedIterator for SnapshotIter<V> {}
