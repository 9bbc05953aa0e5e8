//! Shareable writer for [`LruMap`].
//!
//! ```text
//!   ConcurrentLruMap (Clone)
//!   ┌─────────────────────────────────────────────┐
//!   │  Arc<Mutex<LruMap>>   ◄── writes: lock       │
//!   │  LruMapReader         ◄── reads: no lock     │
//!   └─────────────────────────────────────────────┘
//! ```
//!
//! Writers from any thread serialize on a `parking_lot::Mutex`; reads bypass
//! the lock entirely through the map's reader handle, so a slow writer never
//! stalls a lookup.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::SystemClock;
use crate::ds::AtomicSlotDict;
use crate::policy::lru_map::{hash_key, LruMap, LruMapReader};
use crate::reclaim::DelayedReclaimer;
use crate::traits::{Clock, Reclaim, SlotDictionary};

#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;

/// [`LruMap`] whose writer side can be shared between threads.
///
/// Cloning is cheap and every clone refers to the same map.
///
/// # Example
///
/// ```
/// use std::thread;
/// use std::time::Duration;
/// use slotlru::policy::ConcurrentLruMap;
///
/// let map: ConcurrentLruMap<u64> = ConcurrentLruMap::with_bits(6, Duration::from_millis(10));
///
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let map = map.clone();
///         thread::spawn(move || {
///             for i in 0..8 {
///                 map.insert_or_update(t * 100 + i, i);
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(map.len(), 32);
/// assert_eq!(map.get(305).as_deref(), Some(&5));
/// ```
pub struct ConcurrentLruMap<V, D = AtomicSlotDict, R = DelayedReclaimer<V>, C = SystemClock>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    writer: Arc<Mutex<LruMap<V, D, R, C>>>,
    reader: LruMapReader<V, D>,
}

impl<V, D, R, C> Clone for ConcurrentLruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            reader: self.reader.clone(),
        }
    }
}

impl<V: Send + Sync> ConcurrentLruMap<V> {
    /// Creates a map with `1 << bits` slots and its own delayed reclaimer.
    ///
    /// # Panics
    ///
    /// Panics on the same configuration errors as [`LruMap::new`].
    pub fn with_bits(bits: u32, reclaim_delay: Duration) -> Self {
        Self::new(LruMap::new(bits, reclaim_delay))
    }
}

impl<V, D, R, C> From<LruMap<V, D, R, C>> for ConcurrentLruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn from(map: LruMap<V, D, R, C>) -> Self {
        Self::new(map)
    }
}

impl<V, D, R, C> ConcurrentLruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    /// Wraps an existing map.
    pub fn new(map: LruMap<V, D, R, C>) -> Self {
        let reader = map.reader();
        Self {
            writer: Arc::new(Mutex::new(map)),
            reader,
        }
    }

    /// Unwraps the map if this is the last clone.
    pub fn try_into_inner(self) -> Result<LruMap<V, D, R, C>, Self> {
        let reader = self.reader;
        Arc::try_unwrap(self.writer)
            .map(Mutex::into_inner)
            .map_err(|writer| Self { writer, reader })
    }

    /// Returns a lock-free read handle.
    pub fn reader(&self) -> LruMapReader<V, D> {
        self.reader.clone()
    }

    #[inline]
    pub fn get(&self, key: u64) -> Option<Arc<V>> {
        self.reader.get(key)
    }

    #[inline]
    pub fn get_with<T>(&self, key: u64, f: impl FnOnce(&V) -> T) -> Option<T> {
        self.reader.get_with(key, f)
    }

    #[inline]
    pub fn get_bytes(&self, key: &[u8]) -> Option<Arc<V>> {
        self.reader.get_bytes(key)
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.reader.contains(key)
    }

    pub fn get_all(&self, out: &mut Vec<Arc<V>>) {
        self.reader.get_all(out);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.reader.capacity()
    }

    pub fn insert_or_update(&self, key: u64, value: V) {
        let value = Arc::new(value);
        self.writer.lock().insert_or_update_arc(key, value);
    }

    pub fn insert_or_update_arc(&self, key: u64, value: Arc<V>) {
        self.writer.lock().insert_or_update_arc(key, value);
    }

    pub fn insert_or_update_bytes(&self, key: &[u8], value: V) {
        self.insert_or_update(hash_key(key), value);
    }

    /// See [`LruMap::insert_or_update_evict_on_miss`].
    pub fn insert_or_update_evict_on_miss(&self, key: u64, value: V) {
        self.writer.lock().insert_or_update_evict_on_miss(key, value);
    }

    /// Inserts or replaces `key`, then runs `handler` on the replaced payload
    /// after the writer lock has been released.
    pub fn insert_or_update_with_handler<F>(&self, key: u64, value: V, handler: F)
    where
        F: FnOnce(Arc<V>),
    {
        let mut replaced = None;
        self.writer
            .lock()
            .insert_or_update_with_handler(key, value, |old| replaced = Some(old));
        if let Some(old) = replaced {
            handler(old);
        }
    }

    /// Inserts or replaces `key` only if no other writer holds the lock.
    ///
    /// Hands `value` back when the lock is busy.
    pub fn try_insert_or_update(&self, key: u64, value: V) -> Result<(), V> {
        match self.writer.try_lock() {
            Some(mut map) => {
                map.insert_or_update(key, value);
                Ok(())
            },
            None => Err(value),
        }
    }

    pub fn evict_lru(&self) -> Option<u64> {
        self.writer.lock().evict_lru()
    }

    pub fn remove(&self, key: u64) -> bool {
        self.writer.lock().remove(key)
    }

    pub fn touch(&self, key: u64) -> bool {
        self.writer.lock().touch(key)
    }

    pub fn peek_lru(&self) -> Option<Arc<V>> {
        self.writer.lock().peek_lru()
    }

    pub fn peek_mru(&self) -> Option<Arc<V>> {
        self.writer.lock().peek_mru()
    }

    pub fn reclaim_expired(&self) -> usize {
        self.writer.lock().reclaim_expired()
    }

    /// Runs `f` with exclusive access to the underlying map.
    pub fn with_writer<T>(&self, f: impl FnOnce(&mut LruMap<V, D, R, C>) -> T) -> T {
        f(&mut self.writer.lock())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        self.reader.metrics_snapshot()
    }
}

impl<V, D, R, C> fmt::Debug for ConcurrentLruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentLruMap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "metrics")]
impl<V, D, R, C> MetricsSnapshotProvider<LruMapMetricsSnapshot> for ConcurrentLruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn snapshot(&self) -> LruMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn writes_through_lock_are_visible_to_readers() {
        let map: ConcurrentLruMap<u32> = ConcurrentLruMap::with_bits(2, Duration::from_millis(1));
        let reader = map.reader();
        map.insert_or_update(1, 10);
        map.insert_or_update_bytes(b"k", 20);
        assert_eq!(reader.get(1).as_deref(), Some(&10));
        assert_eq!(map.get_bytes(b"k").as_deref(), Some(&20));
        assert!(map.touch(1));
        assert!(map.remove(1));
        assert!(!map.contains(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn handler_runs_outside_the_lock() {
        let map: ConcurrentLruMap<u32> = ConcurrentLruMap::with_bits(2, Duration::from_millis(1));
        map.insert_or_update(1, 1);
        let other = map.clone();
        let mut seen = None;
        map.insert_or_update_with_handler(1, 2, |old| {
            // would deadlock if the writer lock were still held
            other.insert_or_update(2, 2);
            seen = Some(*old);
        });
        assert_eq!(seen, Some(1));
        assert_eq!(map.get(2).as_deref(), Some(&2));
    }

    #[test]
    fn evict_on_miss_through_lock() {
        let map: ConcurrentLruMap<u32> = ConcurrentLruMap::with_bits(1, Duration::from_millis(1));
        map.insert_or_update(1, 1);
        map.insert_or_update(2, 2);
        map.insert_or_update_evict_on_miss(1, 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1).as_deref(), Some(&10));

        map.insert_or_update(1, 11);
        assert_eq!(map.len(), 1);
        assert!(!map.contains(2));
    }

    #[test]
    fn try_insert_hands_value_back_when_busy() {
        let map: ConcurrentLruMap<String> =
            ConcurrentLruMap::with_bits(1, Duration::from_millis(1));
        let busy = map.with_writer(|_| map.try_insert_or_update(1, "x".to_string()));
        assert_eq!(busy, Err("x".to_string()));
        assert_eq!(map.try_insert_or_update(1, "y".to_string()), Ok(()));
        assert_eq!(map.get(1).as_deref().map(String::as_str), Some("y"));
    }

    #[test]
    fn try_into_inner_requires_last_clone() {
        let map: ConcurrentLruMap<u8> = ConcurrentLruMap::with_bits(1, Duration::from_millis(1));
        let clone = map.clone();
        let map = map.try_into_inner().unwrap_err();
        drop(clone);
        let inner = map.try_into_inner().unwrap();
        assert_eq!(inner.capacity(), 2);
    }

    #[test]
    fn concurrent_writers_keep_capacity_bound() {
        let map: ConcurrentLruMap<u64> = ConcurrentLruMap::with_bits(4, Duration::from_millis(1));
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let map = map.clone();
                thread::spawn(move || {
                    for i in 0..500u64 {
                        map.insert_or_update(t * 10_000 + i, i);
                        assert!(map.len() <= 16);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(map.len(), 16);
        map.with_writer(|w| w.debug_validate_invariants());
    }
}
