//! Timestamp sources for access bookkeeping and reclaim deadlines.
//!
//! All timestamps are signed microseconds. [`SystemClock`] anchors the wall
//! clock once per process and advances it with [`Instant`], so readings never
//! go backwards even if the system time is adjusted. [`ManualClock`] is a
//! shared counter that tests move by hand.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::traits::Clock;

static ANCHOR: OnceLock<(Instant, i64)> = OnceLock::new();

/// Current process-wide time in microseconds since the Unix epoch.
///
/// Monotonic: later calls never return a smaller value.
pub fn now_micros() -> i64 {
    let (start, wall) = *ANCHOR.get_or_init(|| {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        (Instant::now(), wall)
    });
    // Never hand out 0: the recency list uses it for "never accessed".
    (wall + start.elapsed().as_micros() as i64).max(1)
}

/// Process-wide monotonic clock backed by [`now_micros`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> i64 {
        now_micros()
    }
}

/// Hand-driven clock. Clones share the same counter.
///
/// # Example
///
/// ```
/// use slotlru::clock::ManualClock;
/// use slotlru::traits::Clock;
///
/// let clock = ManualClock::new(100);
/// let view = clock.clone();
/// clock.advance(50);
/// assert_eq!(view.now(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            micros: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Moves the clock to `micros`. Values below the current reading are ignored.
    pub fn set(&self, micros: i64) {
        self.micros.fetch_max(micros, Ordering::AcqRel);
    }

    /// Moves the clock forward by `delta` microseconds.
    pub fn advance(&self, delta: i64) {
        self.micros.fetch_add(delta.max(0), Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> i64 {
        self.micros.load(Ordering::Acquire)
    }
}
