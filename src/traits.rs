//! Seams between the LRU map and the collaborators it composes.
//!
//! The map owns the recency order and the slot array; everything else is
//! reached through one of these traits so it can be swapped out:
//!
//! ```text
//!   writer ──► LruMap ──► SlotDictionary   key -> SlotId (bounded)
//!                 │
//!                 ├─────► RecencyList      SlotId order (ds, not a trait)
//!                 │
//!                 ├─────► Reclaim<V>       deferred drop of replaced payloads
//!                 │
//!                 └─────► Clock            access timestamps
//!
//!   reader ──► LruMapReader ──► SlotDictionary::lookup + slot array
//! ```
//!
//! | Trait             | Default implementation                              |
//! |-------------------|-----------------------------------------------------|
//! | [`SlotDictionary`]| [`AtomicSlotDict`](crate::ds::AtomicSlotDict)       |
//! | [`Reclaim`]       | [`DelayedReclaimer`](crate::reclaim::DelayedReclaimer) |
//! | [`Clock`]         | [`SystemClock`](crate::clock::SystemClock)          |

use std::sync::Arc;

use crate::ds::SlotId;

/// Bijective, bounded mapping from 64-bit keys to slot ids.
///
/// Every method takes `&self`. Read-side methods (`lookup`, `key_of`, `len`,
/// `capacity`) may run on any thread at any time, including while the writer
/// is mutating. Mutating methods (`insert`, `delete_id`) must only ever be
/// invoked by one writer at a time; [`LruMap`](crate::policy::LruMap)
/// guarantees this by taking `&mut self` for every write.
pub trait SlotDictionary: Send + Sync {
    /// Returns the slot currently assigned to `key`.
    ///
    /// Must not miss a key that stays assigned for the whole call, even while
    /// the writer is mutating. Under concurrent writes it may return a slot
    /// that was released during the call, so callers check ownership of
    /// whatever they load from it. [`AtomicSlotDict`](crate::ds::AtomicSlotDict)
    /// retries a disturbed walk as often as needed to meet this.
    fn lookup(&self, key: u64) -> Option<SlotId>;

    /// Returns the slot for `key`, allocating one if the key is new.
    ///
    /// Returns `None` only when the key is new and every slot is taken.
    fn insert(&self, key: u64) -> Option<SlotId>;

    /// Releases the slot `id` and forgets its key.
    ///
    /// Returns `false` if `id` is out of range or not allocated.
    fn delete_id(&self, id: SlotId) -> bool;

    /// Returns the key that owns slot `id`, if the slot is allocated.
    fn key_of(&self, id: SlotId) -> Option<u64>;

    /// Fixed number of slots.
    fn capacity(&self) -> usize;

    /// Number of allocated slots.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }
}

/// Deferred destruction of payloads that left the slot array.
///
/// The map never drops a replaced or evicted payload itself; it hands its
/// reference to `recycle` and the implementation decides when to let go.
pub trait Reclaim<V>: Send + Sync {
    /// Takes ownership of a retired payload. `None` is a no-op.
    fn recycle(&self, payload: Option<Arc<V>>);

    /// Drops every retired payload whose delay has elapsed.
    ///
    /// Returns the number of payloads released.
    fn reclaim_expired(&self) -> usize {
        0
    }

    /// Drops every retired payload regardless of its delay.
    ///
    /// Returns the number of payloads released.
    fn flush(&self) -> usize {
        0
    }

    /// Number of retired payloads still held.
    fn pending(&self) -> usize {
        0
    }
}

/// Monotonic, non-decreasing timestamp source in microseconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> i64 {
        (**self).now()
    }
}
