//! # syncset
//!
//! A thread-safe, unordered keyed set for sharing a registry of items between threads.
//!
//! ## Features
//!
//! - **Derived keys**: items are addressed through key accessors, closures that compute the
//!   string identity of an item on demand
//! - **Check-then-act atomicity**: `add` only inserts when the key is absent and `pop` only
//!   removes what it returns, even under contention
//! - **Sharded locking**: keys are spread across independently locked shards so operations on
//!   different keys rarely contend
//! - **Snapshot iteration**: iterators walk a frozen copy of the set, immune to later mutation
//!
//! ## Quick Start
//!
//! ```rust
//! use syncset::ConcurrentSet;
//!
//! let set = ConcurrentSet::new();
//! set.add(|| "alpha", 1)?;
//! assert!(set.add(|| "alpha", 2).is_err());
//! assert_eq!(set.peek(|| "alpha")?, 1);
//! assert_eq!(set.pop(|| "alpha")?, 1);
//! assert_eq!(set.count(), 0);
//! # Ok::<(), syncset::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! `ConcurrentSet` is `Send + Sync` whenever its values are, and is meant to be shared behind
//! an `Arc`. No operation performs I/O; blocking is limited to short shard lock acquisitions.
//!
//! ## Logging
//!
//! Enable the `tracing` feature to emit `tracing` events for rejected operations and clears.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

/// Emits a `tracing` event when the `tracing` feature is enabled, and nothing otherwise.
macro_rules! event {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)*);
    };
}

pub mod metrics;
pub mod set;

pub use crate::metrics::{MetricsCollector, PerformanceMetrics};
pub use crate::set::{ConcurrentSet, KeyAccessor, SetBuilder, SetConfig, SnapshotIter};

/// Common utilities and helper types
pub mod util {
    /// Cache line size for alignment purposes
    pub const CACHE_LINE_SIZE: usize = 64;

    /// Pad a value to cache line size so neighbouring shards do not share a line
    #[repr(align(64))]
    pub struct CachePadded<T> {
        value: T,
    }

    impl<T> CachePadded<T> {
        /// Create a new cache-padded value
        #[inline]
        pub const fn new(value: T) -> Self {
            Self { value }
        }

        /// Get a reference to the inner value
        #[inline]
        pub const fn get(&self) -> &T {
            &self.value
        }

        /// Get a mutable reference to the inner value
        #[inline]
        pub fn get_mut(&mut self) -> &mut T {
            &mut self.value
        }

        /// Get the inner value
        #[inline]
        pub fn into_inner(self) -> T {
            self.value
        }
    }

    impl<T: core::fmt::Debug> core::fmt::Debug for CachePadded<T> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(&self.value, f)
        }
    }
}

/// Error types for set operations
///
/// Both conditions are expected outcomes of racing callers and carry the derived key that
/// triggered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `add` targeted a key that is currently present
    AlreadyExists {
        /// The derived key
        key: String,
    },
    /// `peek` or `pop` targeted a key that is currently absent
    KeyNotFound {
        /// The derived key
        key: String,
    },
}

impl Error {
    /// The key the failed operation was addressed to
    pub fn key(&self) -> &str {
        match self {
            Error::AlreadyExists { key } | Error::KeyNotFound { key } => key,
        }
    }

    /// Returns `true` for [`Error::AlreadyExists`]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }

    /// Returns `true` for [`Error::KeyNotFound`]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::AlreadyExists { key } => write!(f, "item already exists: {key}"),
            Error::KeyNotFound { key } => write!(f, "key does not exist: {key}"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for set operations
pub type Result<T> = core::result::Result<T, Error>;
