//! # Single-writer / multi-reader LRU map
//!
//! Fixed-capacity map from 64-bit keys to `Arc<V>` payloads with strict LRU
//! eviction. One [`LruMap`] owns every mutation; any number of
//! [`LruMapReader`] handles look values up concurrently without locks.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────── LruMap (writer, &mut self) ─────────────┐
//!   │                                                                         │
//!   │   RecencyList            Arc<R: Reclaim<V>>          C: Clock           │
//!   │   head ─► [2]◄─►[0]◄─►[3] ◄─ tail                                        │
//!   │           LRU          MRU                                              │
//!   │                                                                         │
//!   │   ┌────────────────── Arc<Shared> ──────────────────────────────────┐   │
//!   │   │  D: SlotDictionary      key ─► SlotId                           │   │
//!   │   │  slots: [ArcSwapOption<Tagged<V>>; capacity]                    │   │
//!   │   │          0: {key k0, Arc<V>}  1: -  2: {k2, ..}  3: {k3, ..}     │   │
//!   │   └──────────────────────────────────▲──────────────────────────────┘   │
//!   └──────────────────────────────────────┼──────────────────────────────────┘
//!                                          │ clone of Arc<Shared>
//!                         LruMapReader ────┘   (Clone + Send + Sync)
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   insert_or_update(k, v)           (writer)
//!     1. if the dictionary is full, evict the LRU slot, even when k is present:
//!        pop head ─► clear slot cell ─► delete_id ─► reclaimer.recycle(old)
//!     2. lookup k, or insert k ─► slot (fatal if the dictionary is still full)
//!     3. swap {k, v} into the slot cell; previous payload ─► reclaimer
//!     4. recency.access_at(slot, clock.now())
//!
//!   get(k)                            (any thread, no locks)
//!     1. lookup k ─► slot
//!     2. load slot cell; return payload only if its tag is k
//! ```
//!
//! `get` never touches the recency list: reads do not promote entries, which
//! is what lets them run without synchronizing with the writer. The writer can
//! promote explicitly with [`LruMap::touch`].
//!
//! ## Reclamation
//!
//! Slot cells are `arc_swap::ArcSwapOption`s, so a reader's load is lock-free
//! and whatever it returns stays alive for as long as the reader holds it.
//! Replaced and evicted payloads are handed to the configured [`Reclaim`]
//! implementation, which decides when the map's own reference is dropped.
//!
//! | Write method                          | Replaced payload goes to        |
//! |---------------------------------------|---------------------------------|
//! | `insert_or_update` / `_arc` / `_bytes`| reclaimer                       |
//! | `insert_or_update_with_handler`       | caller's handler, synchronously |
//! | `insert_or_update_without_delay`      | dropped on the spot             |
//!
//! Evictions always go to the reclaimer, whichever method triggered them.
//!
//! A write into a full map evicts before it looks the key up, so updating a
//! resident key can evict it (or another entry). When the key is the LRU
//! entry it is evicted and re-inserted as new; the handler variant then has
//! nothing to hand over. [`LruMap::insert_or_update_evict_on_miss`] only
//! evicts when the key is absent.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use slotlru::policy::LruMap;
//!
//! let mut map: LruMap<String> = LruMap::new(1, Duration::from_millis(10)); // 2 slots
//! let reader = map.reader();
//!
//! map.insert_or_update(1, "one".to_string());
//! map.insert_or_update(2, "two".to_string());
//! assert_eq!(reader.get(1).as_deref().map(String::as_str), Some("one"));
//!
//! // reads do not promote: key 1 is still the LRU entry
//! map.insert_or_update(3, "three".to_string());
//! assert!(reader.get(1).is_none());
//! assert_eq!(map.len(), 2);
//! ```

use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use log::{debug, error, trace};
use rustc_hash::FxHasher;

use crate::builder::LruMapBuilder;
use crate::clock::SystemClock;
use crate::ds::recency_list::MAX_CAPACITY;
use crate::ds::{AtomicSlotDict, RecencyList, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::reclaim::DelayedReclaimer;
use crate::traits::{Clock, Reclaim, SlotDictionary};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMapMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{LruMapMetricsRecorder, MetricsSnapshotProvider};

/// Hashes a byte key to the 64-bit key space used by the map.
///
/// Distinct byte strings that collide share one entry.
#[inline]
pub fn hash_key(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Payload stored in a slot cell, tagged with the key that owns the slot.
struct Tagged<V> {
    key: u64,
    payload: Arc<V>,
}

impl<V> Tagged<V> {
    fn into_payload(tagged: Arc<Self>) -> Arc<V> {
        match Arc::try_unwrap(tagged) {
            Ok(tagged) => tagged.payload,
            Err(shared) => Arc::clone(&shared.payload),
        }
    }
}

/// When a write into a full map makes room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eviction {
    WhenFull,
    OnMiss,
}

/// State visible to both the writer and reader handles.
struct Shared<V, D> {
    dict: D,
    slots: Box<[ArcSwapOption<Tagged<V>>]>,
    #[cfg(feature = "metrics")]
    metrics: LruMapMetrics,
}

impl<V, D: SlotDictionary> Shared<V, D> {
    fn new(dict: D) -> Self {
        let slots = (0..dict.capacity()).map(|_| ArcSwapOption::empty()).collect();
        Self {
            dict,
            slots,
            #[cfg(feature = "metrics")]
            metrics: LruMapMetrics::default(),
        }
    }

    fn get_with<T>(&self, key: u64, f: impl FnOnce(&Arc<V>) -> T) -> Option<T> {
        let found = self.dict.lookup(key).and_then(|slot| {
            let guard = self.slots.get(slot.index())?.load();
            match &*guard {
                Some(tagged) if tagged.key == key => Some(f(&tagged.payload)),
                _ => None,
            }
        });

        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }

        found
    }

    fn payload_at(&self, slot: SlotId) -> Option<Arc<V>> {
        self.slots
            .get(slot.index())?
            .load_full()
            .map(|tagged| Arc::clone(&tagged.payload))
    }

    fn get_all(&self, out: &mut Vec<Arc<V>>) {
        out.clear();
        for cell in self.slots.iter() {
            if let Some(tagged) = &*cell.load() {
                out.push(Arc::clone(&tagged.payload));
            }
        }
    }

    #[cfg(feature = "metrics")]
    fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        self.metrics.snapshot(self.dict.len(), self.dict.capacity())
    }
}

#[cold]
#[track_caller]
fn broken_invariant(msg: String) -> ! {
    error!("{msg}");
    panic!("{msg}");
}

// ---------------------------------------------------------------------------
// LruMapReader
// ---------------------------------------------------------------------------

/// Lock-free read handle onto an [`LruMap`].
///
/// Cheap to clone and `Send + Sync` for `V: Send + Sync`. Readers never block
/// the writer and never see a payload under a key it does not belong to.
/// Once the writer is dropped, every lookup through a reader misses.
pub struct LruMapReader<V, D = AtomicSlotDict> {
    shared: Arc<Shared<V, D>>,
}

impl<V, D> Clone for LruMapReader<V, D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V, D: SlotDictionary> LruMapReader<V, D> {
    /// Returns the payload stored under `key`.
    ///
    /// Does not update recency.
    #[inline]
    pub fn get(&self, key: u64) -> Option<Arc<V>> {
        self.shared.get_with(key, Arc::clone)
    }

    /// Runs `f` on the payload stored under `key` without cloning the `Arc`.
    #[inline]
    pub fn get_with<T>(&self, key: u64, f: impl FnOnce(&V) -> T) -> Option<T> {
        self.shared.get_with(key, |payload| f(&**payload))
    }

    /// [`get`](Self::get) for a byte key hashed with [`hash_key`].
    #[inline]
    pub fn get_bytes(&self, key: &[u8]) -> Option<Arc<V>> {
        self.get(hash_key(key))
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.shared.get_with(key, |_| ()).is_some()
    }

    /// Replaces the contents of `out` with every live payload, in slot order.
    pub fn get_all(&self, out: &mut Vec<Arc<V>>) {
        self.shared.get_all(out);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shared.dict.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.dict.capacity()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        self.shared.metrics_snapshot()
    }
}

impl<V, D: SlotDictionary> fmt::Debug for LruMapReader<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruMapReader")
            .field("len", &self.shared.dict.len())
            .field("capacity", &self.shared.dict.capacity())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// LruMap
// ---------------------------------------------------------------------------

/// Fixed-capacity LRU map; the unique writer.
///
/// Every mutation takes `&mut self`, so there is exactly one writer at a time
/// by construction. Share writes between threads with
/// [`ConcurrentLruMap`](crate::policy::ConcurrentLruMap); share reads with
/// [`reader`](Self::reader).
///
/// Dropping the map hands every live payload to the reclaimer. A reclaimer
/// created by the map (`new`, the builder) is dropped with it and releases
/// everything; a shared one passed to `with_reclaimer` keeps them until its own
/// delay elapses.
pub struct LruMap<V, D = AtomicSlotDict, R = DelayedReclaimer<V>, C = SystemClock>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    shared: Arc<Shared<V, D>>,
    recency: RecencyList,
    reclaimer: Arc<R>,
    clock: C,
}

impl<V: Send + Sync> LruMap<V> {
    /// Creates a map with `1 << bits` slots and its own [`DelayedReclaimer`].
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_BITS`](crate::builder::MAX_BITS) or the
    /// delay does not fit in `i64` microseconds.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use slotlru::policy::LruMap;
    ///
    /// let map: LruMap<u64> = LruMap::new(4, Duration::from_millis(50));
    /// assert_eq!(map.capacity(), 16);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(bits: u32, reclaim_delay: Duration) -> Self {
        LruMapBuilder::new(bits).reclaim_delay(reclaim_delay).build()
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(bits: u32, reclaim_delay: Duration) -> Result<Self, ConfigError> {
        LruMapBuilder::new(bits)
            .reclaim_delay(reclaim_delay)
            .try_build()
    }
}

impl<V, R> LruMap<V, AtomicSlotDict, R, SystemClock>
where
    V: Send + Sync,
    R: Reclaim<V>,
{
    /// Creates a map with `1 << bits` slots that retires payloads into a
    /// reclaimer shared with other owners.
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_BITS`](crate::builder::MAX_BITS).
    pub fn with_reclaimer(bits: u32, reclaimer: Arc<R>) -> Self {
        LruMapBuilder::new(bits).build_with_reclaimer(reclaimer)
    }
}

impl<V, D, R, C> LruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    /// Assembles a map from explicit collaborators.
    ///
    /// The map's capacity is the dictionary's capacity. Fails if the
    /// dictionary already holds keys or has no slots.
    pub fn from_parts(dict: D, reclaimer: Arc<R>, clock: C) -> Result<Self, ConfigError> {
        let capacity = dict.capacity();
        if capacity == 0 {
            return Err(ConfigError::new("slot dictionary capacity must be > 0"));
        }
        if capacity > MAX_CAPACITY {
            return Err(ConfigError::new(format!(
                "slot dictionary capacity {capacity} exceeds {MAX_CAPACITY}"
            )));
        }
        if !dict.is_empty() {
            return Err(ConfigError::new(format!(
                "slot dictionary must start empty, found {} keys",
                dict.len()
            )));
        }
        debug!("lru map created with {capacity} slots");
        Ok(Self {
            shared: Arc::new(Shared::new(dict)),
            recency: RecencyList::new(capacity),
            reclaimer,
            clock,
        })
    }

    /// Returns a new lock-free read handle.
    pub fn reader(&self) -> LruMapReader<V, D> {
        LruMapReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns the payload stored under `key`. Does not update recency.
    #[inline]
    pub fn get(&self, key: u64) -> Option<Arc<V>> {
        self.shared.get_with(key, Arc::clone)
    }

    /// Runs `f` on the payload stored under `key`. Does not update recency.
    #[inline]
    pub fn get_with<T>(&self, key: u64, f: impl FnOnce(&V) -> T) -> Option<T> {
        self.shared.get_with(key, |payload| f(&**payload))
    }

    /// [`get`](Self::get) for a byte key hashed with [`hash_key`].
    #[inline]
    pub fn get_bytes(&self, key: &[u8]) -> Option<Arc<V>> {
        self.get(hash_key(key))
    }

    /// Same answer as [`LruMapReader::contains`]: the slot must hold a payload
    /// tagged with `key`.
    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.shared.get_with(key, |_| ()).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shared.dict.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.recency.capacity()
    }

    /// Timestamp of the last write or touch of `key`.
    pub fn last_access(&self, key: u64) -> Option<i64> {
        let slot = self.shared.dict.lookup(key)?;
        Some(self.recency.last_access(slot))
    }

    /// Inserts or replaces `key`, retiring any replaced payload to the reclaimer.
    ///
    /// Evicts the least recently written entry first whenever the map is full,
    /// even if `key` is already present.
    ///
    /// # Panics
    ///
    /// Panics if the dictionary has no free slot after eviction; that means
    /// the recency list and the dictionary disagree about occupancy.
    pub fn insert_or_update(&mut self, key: u64, value: V) {
        self.insert_or_update_arc(key, Arc::new(value));
    }

    /// [`insert_or_update`](Self::insert_or_update) with an already shared payload.
    pub fn insert_or_update_arc(&mut self, key: u64, value: Arc<V>) {
        let replaced = self.place(key, value, Eviction::WhenFull);
        self.reclaimer.recycle(replaced);
    }

    /// [`insert_or_update`](Self::insert_or_update) that only evicts when `key`
    /// is absent, so updating a resident key never shrinks a full map.
    pub fn insert_or_update_evict_on_miss(&mut self, key: u64, value: V) {
        let replaced = self.place(key, Arc::new(value), Eviction::OnMiss);
        self.reclaimer.recycle(replaced);
    }

    /// [`insert_or_update`](Self::insert_or_update) for a byte key hashed with [`hash_key`].
    pub fn insert_or_update_bytes(&mut self, key: &[u8], value: V) {
        self.insert_or_update(hash_key(key), value);
    }

    /// Inserts or replaces `key`, passing the replaced payload to `handler`.
    ///
    /// `handler` runs synchronously and only when a payload was replaced.
    /// Entries evicted to make room still go to the reclaimer.
    pub fn insert_or_update_with_handler<F>(&mut self, key: u64, value: V, handler: F)
    where
        F: FnOnce(Arc<V>),
    {
        if let Some(replaced) = self.place(key, Arc::new(value), Eviction::WhenFull) {
            #[cfg(feature = "metrics")]
            self.shared.metrics.record_handler_call();
            handler(replaced);
        }
    }

    /// Inserts or replaces `key`, dropping the map's reference to the replaced
    /// payload immediately.
    ///
    /// Intended for phases without concurrent readers: a reader still holding
    /// the old payload keeps it alive, and its destructor then runs on that
    /// reader's thread when it lets go.
    pub fn insert_or_update_without_delay(&mut self, key: u64, value: V) {
        if let Some(replaced) = self.place(key, Arc::new(value), Eviction::WhenFull) {
            #[cfg(feature = "metrics")]
            self.shared.metrics.record_immediate_drop();
            drop(replaced);
        }
    }

    /// [`insert_or_update_without_delay`](Self::insert_or_update_without_delay)
    /// for a byte key hashed with [`hash_key`].
    pub fn insert_or_update_bytes_without_delay(&mut self, key: &[u8], value: V) {
        self.insert_or_update_without_delay(hash_key(key), value);
    }

    /// Evicts the least recently written entry.
    ///
    /// Returns the evicted key, or `None` if the map is empty.
    pub fn evict_lru(&mut self) -> Option<u64> {
        let slot = self.recency.pop_oldest()?;
        let retired = self.shared.slots[slot.index()].swap(None);
        let key = self.shared.dict.key_of(slot);
        let key = match (key, self.shared.dict.delete_id(slot)) {
            (Some(key), true) => key,
            _ => broken_invariant(format!(
                "evicted slot {} is not allocated in the slot dictionary",
                slot.index()
            )),
        };
        trace!("evicted slot {} (key {key:#x})", slot.index());

        #[cfg(feature = "metrics")]
        self.shared.metrics.record_evicted_entry();

        self.reclaimer.recycle(retired.map(Tagged::into_payload));
        Some(key)
    }

    /// Removes `key`, retiring its payload to the reclaimer.
    ///
    /// Returns `false` if `key` is absent.
    pub fn remove(&mut self, key: u64) -> bool {
        let Some(slot) = self.shared.dict.lookup(key) else {
            return false;
        };
        self.recency.remove(slot);
        let retired = self.shared.slots[slot.index()].swap(None);
        if !self.shared.dict.delete_id(slot) {
            broken_invariant(format!(
                "slot {} found for key {key:#x} but could not be released",
                slot.index()
            ));
        }

        #[cfg(feature = "metrics")]
        self.shared.metrics.record_remove();

        self.reclaimer.recycle(retired.map(Tagged::into_payload));
        true
    }

    /// Marks `key` as most recently used without changing its payload.
    ///
    /// Returns `false` if `key` is absent.
    pub fn touch(&mut self, key: u64) -> bool {
        let Some(slot) = self.shared.dict.lookup(key) else {
            return false;
        };
        self.recency.access_at(slot, self.clock.now());

        #[cfg(feature = "metrics")]
        self.shared.metrics.record_touch();

        true
    }

    /// Payload of the least recently written entry.
    pub fn peek_lru(&self) -> Option<Arc<V>> {
        self.shared.payload_at(self.recency.head()?)
    }

    /// Payload of the most recently written entry.
    pub fn peek_mru(&self) -> Option<Arc<V>> {
        self.shared.payload_at(self.recency.tail()?)
    }

    /// Replaces the contents of `out` with every live payload, in slot order.
    pub fn get_all(&self, out: &mut Vec<Arc<V>>) {
        self.shared.get_all(out);
    }

    /// Keys from least to most recently written.
    pub fn keys_by_recency(&self) -> Vec<u64> {
        self.recency
            .iter()
            .filter_map(|slot| self.shared.dict.key_of(slot))
            .collect()
    }

    /// Releases retired payloads whose delay has elapsed.
    pub fn reclaim_expired(&self) -> usize {
        self.reclaimer.reclaim_expired()
    }

    pub fn recency(&self) -> &RecencyList {
        &self.recency
    }

    pub fn dictionary(&self) -> &D {
        &self.shared.dict
    }

    pub fn reclaimer(&self) -> &Arc<R> {
        &self.reclaimer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Cross-checks the recency list, the dictionary and the slot array.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.recency.check_invariants()?;
        if self.recency.len() != self.shared.dict.len() {
            return Err(InvariantError::new(format!(
                "recency list holds {} slots but dictionary holds {} keys",
                self.recency.len(),
                self.shared.dict.len()
            )));
        }
        if self.shared.slots.len() != self.recency.capacity() {
            return Err(InvariantError::new("slot array and recency list sizes differ"));
        }

        for (idx, cell) in self.shared.slots.iter().enumerate() {
            let slot = SlotId(idx);
            let linked = self.recency.contains(slot);
            let guard = cell.load();
            match (&*guard, self.shared.dict.key_of(slot)) {
                (Some(tagged), Some(key)) if linked => {
                    if tagged.key != key {
                        return Err(InvariantError::new(format!(
                            "slot {idx} holds a payload tagged {:#x} for key {key:#x}",
                            tagged.key
                        )));
                    }
                    if self.shared.dict.lookup(key) != Some(slot) {
                        return Err(InvariantError::new(format!(
                            "key {key:#x} does not resolve back to slot {idx}"
                        )));
                    }
                },
                (None, None) if !linked => {},
                (payload, key) => {
                    return Err(InvariantError::new(format!(
                        "slot {idx} disagrees: linked={linked}, payload={}, key={key:?}",
                        payload.is_some()
                    )));
                },
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("lru map invariant violated: {err}");
        }
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LruMapMetricsSnapshot {
        self.shared.metrics_snapshot()
    }

    /// Stores `payload` under `key` and returns the payload it replaced.
    fn place(&mut self, key: u64, payload: Arc<V>, eviction: Eviction) -> Option<Arc<V>> {
        if eviction == Eviction::WhenFull && self.shared.dict.is_full() {
            self.evict_lru();
        }
        let slot = match self.shared.dict.lookup(key) {
            Some(slot) => slot,
            None => {
                if self.shared.dict.is_full() {
                    self.evict_lru();
                }
                match self.shared.dict.insert(key) {
                    Some(slot) => slot,
                    None => broken_invariant(format!(
                        "slot dictionary full after eviction ({} of {} slots, {} linked)",
                        self.shared.dict.len(),
                        self.shared.dict.capacity(),
                        self.recency.len()
                    )),
                }
            },
        };

        let tagged = Arc::new(Tagged { key, payload });
        let previous = self.shared.slots[slot.index()].swap(Some(tagged));
        self.recency.access_at(slot, self.clock.now());
        debug_assert!(previous.as_ref().map_or(true, |p| p.key == key));

        #[cfg(feature = "metrics")]
        if previous.is_some() {
            self.shared.metrics.record_insert_update();
        } else {
            self.shared.metrics.record_insert_new();
        }

        previous.map(Tagged::into_payload)
    }
}

impl<V, D, R, C> Drop for LruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn drop(&mut self) {
        for cell in self.shared.slots.iter() {
            self.reclaimer.recycle(cell.swap(None).map(Tagged::into_payload));
        }
    }
}

impl<V, D, R, C> fmt::Debug for LruMap<V, D, R, C>
where
    V: Send + Sync,
    D: SlotDictionary,
    R: Reclaim<V>,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruMap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("pending_reclaim", &self.reclaimer.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "metrics")]
impl<V, D, R, C> MetricsSnapshotProvider<LruMapMetricsSnapshot> for LruMap<V, D, R, C>
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
mod property_tests {
    use super::*;
    use crate::reclaim::ImmediateReclaimer;
    use proptest::prelude::*;
    use std::collections::{HashMap, VecDeque};

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u64, u32),
        InsertOnMiss(u64, u32),
        Touch(u64),
        Remove(u64),
        Evict,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            5 => (0u64..24, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => (0u64..24, any::<u32>()).prop_map(|(k, v)| Op::InsertOnMiss(k, v)),
            2 => (0u64..24).prop_map(Op::Touch),
            1 => (0u64..24).prop_map(Op::Remove),
            1 => Just(Op::Evict),
        ]
    }

    proptest! {
        /// Property: the map behaves like a write-ordered LRU model
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_lru_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut map: LruMap<u32, AtomicSlotDict, ImmediateReclaimer> =
                LruMapBuilder::new(3).build_with_reclaimer(Arc::new(ImmediateReclaimer));
            let capacity = map.capacity();
            let mut order: VecDeque<u64> = VecDeque::new();
            let mut values: HashMap<u64, u32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(key, value) => {
                        if values.len() == capacity {
                            let oldest = order.pop_front().unwrap();
                            values.remove(&oldest);
                        }
                        order.retain(|&k| k != key);
                        order.push_back(key);
                        values.insert(key, value);
                        map.insert_or_update(key, value);
                    },
                    Op::InsertOnMiss(key, value) => {
                        if !values.contains_key(&key) && values.len() == capacity {
                            let oldest = order.pop_front().unwrap();
                            values.remove(&oldest);
                        }
                        order.retain(|&k| k != key);
                        order.push_back(key);
                        values.insert(key, value);
                        map.insert_or_update_evict_on_miss(key, value);
                    },
                    Op::Touch(key) => {
                        let present = values.contains_key(&key);
                        if present {
                            order.retain(|&k| k != key);
                            order.push_back(key);
                        }
                        prop_assert_eq!(map.touch(key), present);
                    },
                    Op::Remove(key) => {
                        let present = values.remove(&key).is_some();
                        order.retain(|&k| k != key);
                        prop_assert_eq!(map.remove(key), present);
                    },
                    Op::Evict => {
                        let expected = order.pop_front();
                        if let Some(key) = expected {
                            values.remove(&key);
                        }
                        prop_assert_eq!(map.evict_lru(), expected);
                    },
                }

                prop_assert_eq!(map.len(), values.len());
                prop_assert!(map.len() <= capacity);
                prop_assert_eq!(map.keys_by_recency(), order.iter().copied().collect::<Vec<_>>());
                for key in 0u64..24 {
                    prop_assert_eq!(map.get(key).map(|v| *v), values.get(&key).copied());
                }
                prop_assert!(map.check_invariants().is_ok());
            }
        }
    }
}
