//! Builder for [`LruMap`] instances.
//!
//! Capacity is configured as a power of two (`1 << bits` slots). The builder
//! wires a slot dictionary, a reclaimer and a clock together; the reclaimer
//! and the map share the same clock.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use slotlru::builder::LruMapBuilder;
//! use slotlru::clock::ManualClock;
//!
//! let clock = ManualClock::new(1);
//! let mut map = LruMapBuilder::new(3)
//!     .reclaim_delay(Duration::from_millis(2))
//!     .clock(clock.clone())
//!     .build::<String>();
//!
//! map.insert_or_update(1, "hello".to_string());
//! assert_eq!(map.capacity(), 8);
//! assert_eq!(map.last_access(1), Some(1));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::clock::SystemClock;
use crate::ds::AtomicSlotDict;
use crate::error::ConfigError;
use crate::policy::LruMap;
use crate::reclaim::DelayedReclaimer;
use crate::traits::{Clock, Reclaim};

/// Largest accepted `bits` value (`1 << 30` slots).
pub const MAX_BITS: u32 = 30;

/// Reclaim delay used when none is configured.
pub const DEFAULT_RECLAIM_DELAY: Duration = Duration::from_secs(1);

/// Map returned by [`LruMapBuilder::build`].
pub type BuiltLruMap<V, C = SystemClock> = LruMap<V, AtomicSlotDict, DelayedReclaimer<V, C>, C>;

/// Checks `bits` and returns the matching slot count.
pub fn capacity_for_bits(bits: u32) -> Result<usize, ConfigError> {
    if bits > MAX_BITS {
        return Err(ConfigError::new(format!(
            "bits must be <= {MAX_BITS}, got {bits}"
        )));
    }
    Ok(1usize << bits)
}

/// Builder for creating [`LruMap`] instances.
#[derive(Debug, Clone)]
pub struct LruMapBuilder<C = SystemClock> {
    bits: u32,
    reclaim_delay: Duration,
    clock: C,
}

impl LruMapBuilder<SystemClock> {
    /// Create a builder for a map with `1 << bits` slots.
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            reclaim_delay: DEFAULT_RECLAIM_DELAY,
            clock: SystemClock,
        }
    }
}

impl<C: Clock + Clone> LruMapBuilder<C> {
    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// How long retired payloads are held before being dropped.
    ///
    /// Ignored by [`build_with_reclaimer`](Self::build_with_reclaimer).
    pub fn reclaim_delay(mut self, delay: Duration) -> Self {
        self.reclaim_delay = delay;
        self
    }

    /// Replace the timestamp source for recency and reclaim deadlines.
    pub fn clock<C2: Clock + Clone>(self, clock: C2) -> LruMapBuilder<C2> {
        LruMapBuilder {
            bits: self.bits,
            reclaim_delay: self.reclaim_delay,
            clock,
        }
    }

    /// Build a map that owns its [`DelayedReclaimer`].
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_BITS`] or the delay does not fit in
    /// `i64` microseconds. Use [`try_build`](Self::try_build) to handle these.
    pub fn build<V: Send + Sync>(self) -> BuiltLruMap<V, C> {
        match self.try_build() {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_build<V: Send + Sync>(self) -> Result<BuiltLruMap<V, C>, ConfigError> {
        let capacity = capacity_for_bits(self.bits)?;
        let reclaimer = DelayedReclaimer::try_with_clock(self.reclaim_delay, self.clock.clone())?;
        LruMap::from_parts(
            AtomicSlotDict::with_capacity(capacity),
            Arc::new(reclaimer),
            self.clock,
        )
    }

    /// Build a map that retires payloads into `reclaimer`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_BITS`].
    pub fn build_with_reclaimer<V, R>(self, reclaimer: Arc<R>) -> LruMap<V, AtomicSlotDict, R, C>
    where
        V: Send + Sync,
        R: Reclaim<V>,
    {
        match self.try_build_with_reclaimer(reclaimer) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_build_with_reclaimer<V, R>(
        self,
        reclaimer: Arc<R>,
    ) -> Result<LruMap<V, AtomicSlotDict, R, C>, ConfigError>
    where
        V: Send + Sync,
        R: Reclaim<V>,
    {
        let capacity = capacity_for_bits(self.bits)?;
        LruMap::from_parts(AtomicSlotDict::with_capacity(capacity), reclaimer, self.clock)
    }
}
