//! Deferred destruction of payloads retired by the writer.
//!
//! Replacing or evicting a slot hands the map's reference to a [`Reclaim`]
//! implementation instead of dropping it inline. Readers always hold their own
//! `Arc`, so memory safety never depends on the delay; what the delay controls
//! is *when* the payload's destructor runs (and on which thread), which keeps
//! expensive drops off the insertion hot path and out of a reader's hands.
//!
//! | Type                  | Behavior                                          |
//! |-----------------------|---------------------------------------------------|
//! | [`DelayedReclaimer`]  | holds each payload for a fixed delay, then drops  |
//! | [`ImmediateReclaimer`]| drops on `recycle`                                |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use slotlru::clock::ManualClock;
//! use slotlru::reclaim::DelayedReclaimer;
//! use slotlru::traits::Reclaim;
//!
//! let clock = ManualClock::new(1_000);
//! let reclaimer = DelayedReclaimer::with_clock(Duration::from_millis(5), clock.clone());
//!
//! reclaimer.recycle(Some(Arc::new("retired".to_string())));
//! assert_eq!(reclaimer.pending(), 1);
//!
//! clock.advance(5_000);
//! assert_eq!(reclaimer.reclaim_expired(), 1);
//! assert_eq!(reclaimer.pending(), 0);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;

use crate::clock::SystemClock;
use crate::error::ConfigError;
use crate::traits::{Clock, Reclaim};

struct Retired<V> {
    deadline: i64,
    payload: Arc<V>,
}

/// Holds retired payloads for a fixed delay before dropping them.
///
/// Expired payloads are released lazily: every `recycle` call first drains the
/// ones whose deadline has passed, and [`reclaim_expired`](Reclaim::reclaim_expired)
/// can be called explicitly from a maintenance path. Payloads are always
/// dropped after the internal lock is released. Dropping the reclaimer
/// releases everything still pending.
pub struct DelayedReclaimer<V, C = SystemClock> {
    delay_micros: i64,
    queue: Mutex<VecDeque<Retired<V>>>,
    clock: C,
}

/// Converts a delay to whole microseconds, rejecting values that overflow `i64`.
pub fn delay_to_micros(delay: Duration) -> Result<i64, ConfigError> {
    i64::try_from(delay.as_micros()).map_err(|_| {
        ConfigError::new(format!("reclaim delay {delay:?} does not fit in i64 microseconds"))
    })
}

impl<V> DelayedReclaimer<V, SystemClock> {
    /// Creates a reclaimer on the process-wide clock.
    ///
    /// # Panics
    ///
    /// Panics if `delay` does not fit in `i64` microseconds.
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, SystemClock)
    }
}

impl<V, C: Clock> DelayedReclaimer<V, C> {
    /// Creates a reclaimer driven by `clock`.
    ///
    /// # Panics
    ///
    /// Panics if `delay` does not fit in `i64` microseconds.
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        match Self::try_with_clock(delay, clock) {
            Ok(reclaimer) => reclaimer,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`with_clock`](Self::with_clock).
    pub fn try_with_clock(delay: Duration, clock: C) -> Result<Self, ConfigError> {
        Ok(Self {
            delay_micros: delay_to_micros(delay)?,
            queue: Mutex::new(VecDeque::new()),
            clock,
        })
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_micros as u64)
    }

    // The queue is kept sorted by deadline, so expired entries form a prefix.
    fn take_expired(queue: &mut VecDeque<Retired<V>>, now: i64) -> Vec<Arc<V>> {
        let ready = queue.partition_point(|r| r.deadline <= now);
        queue.drain(..ready).map(|r| r.payload).collect()
    }

    // Appends in the common case; a clock that stepped back inserts in place.
    fn enqueue(queue: &mut VecDeque<Retired<V>>, retired: Retired<V>) {
        if queue.back().map_or(true, |last| last.deadline <= retired.deadline) {
            queue.push_back(retired);
        } else {
            let at = queue.partition_point(|r| r.deadline <= retired.deadline);
            queue.insert(at, retired);
        }
    }
}

impl<V, C> Reclaim<V> for DelayedReclaimer<V, C>
where
    V: Send + Sync,
    C: Clock,
{
    fn recycle(&self, payload: Option<Arc<V>>) {
        let Some(payload) = payload else {
            return;
        };
        let expired = {
            let mut queue = self.queue.lock();
            let now = self.clock.now();
            let expired = Self::take_expired(&mut queue, now);
            Self::enqueue(
                &mut queue,
                Retired {
                    deadline: now.saturating_add(self.delay_micros),
                    payload,
                },
            );
            expired
        };
        drop(expired);
    }

    fn reclaim_expired(&self) -> usize {
        let now = self.clock.now();
        let expired = Self::take_expired(&mut self.queue.lock(), now);
        expired.len()
    }

    fn flush(&self) -> usize {
        let drained: Vec<_> = self.queue.lock().drain(..).collect();
        drained.len()
    }

    fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<V, C> Drop for DelayedReclaimer<V, C> {
    fn drop(&mut self) {
        let pending = self.queue.get_mut().len();
        if pending > 0 {
            debug!("delayed reclaimer dropping {pending} pending payloads");
        }
    }
}

impl<V, C> fmt::Debug for DelayedReclaimer<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedReclaimer")
            .field("delay", &Duration::from_micros(self.delay_micros as u64))
            .field("pending", &self.queue.lock().len())
            .finish_non_exhaustive()
    }
}

/// Drops retired payloads on the spot.
///
/// Suitable when no reader handles exist, or when `V` is cheap to drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateReclaimer;

impl<V: Send + Sync> Reclaim<V> for ImmediateReclaimer {
    #[inline]
    fn recycle(&self, payload: Option<Arc<V>>) {
        drop(payload);
    }
}
