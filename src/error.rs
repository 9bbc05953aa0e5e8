//! Error types for the slotlru library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned by `check_invariants` when the recency list,
//!   slot dictionary and slot array disagree with each other.
//! - [`ConfigError`]: Returned when map configuration parameters are invalid
//!   (e.g. `bits` above [`MAX_BITS`](crate::builder::MAX_BITS), a non-empty
//!   dictionary handed to `from_parts`).
//!
//! Capacity exhaustion is never an error: the writer evicts synchronously.
//! A dictionary that stays full after an eviction is a broken internal
//! invariant and aborts the writer with a panic instead of surfacing here.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use slotlru::error::ConfigError;
//! use slotlru::policy::LruMap;
//!
//! let map: Result<LruMap<String>, ConfigError> = LruMap::try_new(4, Duration::from_millis(10));
//! assert!(map.is_ok());
//!
//! // Oversized slot domain is caught without panicking
//! let bad = LruMap::<String>::try_new(63, Duration::from_millis(10));
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal map invariants are violated.
///
/// Produced by [`RecencyList::check_invariants`](crate::ds::RecencyList::check_invariants)
/// and [`LruMap::check_invariants`](crate::policy::LruMap::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when map configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruMap::try_new`](crate::policy::LruMap::try_new) and
/// [`LruMapBuilder::try_build`](crate::builder::LruMapBuilder::try_build).
///
/// # Example
///
/// ```
/// use slotlru::builder::LruMapBuilder;
///
/// let err = LruMapBuilder::new(40).try_build::<u64>().unwrap_err();
/// assert!(err.to_string().contains("bits"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LruMapBuilder;
    use crate::clock::SystemClock;
    use crate::ds::{AtomicSlotDict, SlotId};
    use crate::policy::LruMap;
    use crate::reclaim::{delay_to_micros, ImmediateReclaimer};
    use crate::traits::SlotDictionary;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn oversized_bits_name_limit_and_value() {
        let Err(err) = LruMapBuilder::new(31).try_build::<u8>() else {
            panic!("bits 31 accepted");
        };
        assert_eq!(err.message(), "bits must be <= 30, got 31");
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn config_error_propagates_through_box_dyn_error() {
        fn open() -> Result<LruMap<u8>, Box<dyn std::error::Error>> {
            Ok(LruMap::try_new(40, Duration::from_millis(1))?)
        }
        let err = open().err().unwrap();
        assert!(err.to_string().ends_with("got 40"));
    }

    #[test]
    fn unrepresentable_delay_is_a_config_error() {
        assert_eq!(delay_to_micros(Duration::from_millis(3)), Ok(3_000));
        let err = delay_to_micros(Duration::MAX).unwrap_err();
        assert!(err.message().starts_with("reclaim delay"));
        assert!(err.message().contains("i64 microseconds"));
    }

    #[test]
    fn zero_capacity_dictionary_is_rejected() {
        let Err(err) = LruMap::<u8, _, _, _>::from_parts(
            AtomicSlotDict::with_capacity(0),
            Arc::new(ImmediateReclaimer),
            SystemClock,
        ) else {
            panic!("empty slot domain accepted");
        };
        assert_eq!(err, ConfigError::new("slot dictionary capacity must be > 0"));
    }

    /// Dictionary whose reported length can be inflated from outside.
    struct DriftingDict {
        inner: AtomicSlotDict,
        extra: Arc<AtomicUsize>,
    }

    impl SlotDictionary for DriftingDict {
        fn lookup(&self, key: u64) -> Option<SlotId> {
            self.inner.lookup(key)
        }
        fn insert(&self, key: u64) -> Option<SlotId> {
            self.inner.insert(key)
        }
        fn delete_id(&self, id: SlotId) -> bool {
            self.inner.delete_id(id)
        }
        fn key_of(&self, id: SlotId) -> Option<u64> {
            self.inner.key_of(id)
        }
        fn capacity(&self) -> usize {
            self.inner.capacity()
        }
        fn len(&self) -> usize {
            self.inner.len() + self.extra.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn occupancy_mismatch_is_an_invariant_error() {
        let extra = Arc::new(AtomicUsize::new(0));
        let dict = DriftingDict {
            inner: AtomicSlotDict::with_capacity(4),
            extra: Arc::clone(&extra),
        };
        let mut map =
            LruMap::<u8, _, _, _>::from_parts(dict, Arc::new(ImmediateReclaimer), SystemClock)
                .unwrap();
        map.insert_or_update(1, 1);
        assert!(map.check_invariants().is_ok());

        extra.store(1, Ordering::SeqCst);
        let err = map.check_invariants().unwrap_err();
        assert_eq!(
            err.message(),
            "recency list holds 1 slots but dictionary holds 2 keys"
        );
        assert!(format!("{err:?}").contains("InvariantError"));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
