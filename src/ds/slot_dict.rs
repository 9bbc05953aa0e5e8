//! Fixed-capacity key → slot dictionary readable without locks.
//!
//! ## Architecture
//!
//! ```text
//!   heads (one per bucket)        per-slot arrays (capacity entries)
//!   ┌────┬────┬────┬────┐         slot:   0     1     2     3
//!   │ 2  │NIL │ 0  │NIL │         keys:  [k0]  [k1]  [k2]  [ - ]
//!   └─┬──┴────┴─┬──┴────┘         chain: [NIL] [NIL] [1]   [ - ]
//!     │         │                 live:  [ y ] [ y ] [ y ] [ n ]
//!     ▼         ▼
//!   slot 2 ──► slot 1             free: [3]   (FIFO, writer only)
//!   slot 0
//! ```
//!
//! Every array is allocated once at construction. Readers walk a bucket chain
//! with acquire loads; the writer publishes a new slot by filling in its key
//! and chain link before storing it as the bucket head, and retires a slot by
//! splicing it out while leaving its own link intact so a reader standing on
//! it can keep walking.
//!
//! A retired slot can be reused for a key in another bucket while a reader is
//! parked on it. Every key on a chain hashes to that chain's bucket, so a
//! reader that meets a foreign key knows it was carried off its chain and
//! restarts from the bucket head. A walk longer than capacity also restarts.
//! Restarts are unbounded: a lookup only returns `None` after a walk that
//! reached the end of its chain without meeting a foreign key, so a key that
//! stays live for the whole call is always found. A restart needs the writer
//! to have recycled a slot mid-walk, which makes `lookup` lock-free but not
//! wait-free.
//!
//! Slots are recycled in FIFO order, which keeps a just-retired slot out of
//! circulation for as long as possible.
//!
//! ## Thread Safety
//!
//! `lookup`, `key_of`, `len` and `capacity` may be called from any thread.
//! `insert` and `delete_id` must be serialized by the caller (the map's single
//! writer); the internal free-list mutex only exists to keep the type `Sync`
//! and is never contended in that setup.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hasher;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHasher;

use crate::ds::slot_id::SlotId;
use crate::traits::SlotDictionary;

const NIL: u32 = u32::MAX;

/// Lock-free-read [`SlotDictionary`] with FIFO slot reuse.
pub struct AtomicSlotDict {
    heads: Box<[AtomicU32]>,
    keys: Box<[AtomicU64]>,
    chain: Box<[AtomicU32]>,
    live: Box<[AtomicBool]>,
    free: Mutex<VecDeque<u32>>,
    len: AtomicUsize,
    bucket_mask: usize,
}

impl AtomicSlotDict {
    /// Creates a dictionary with `1 << bits` slots.
    pub fn with_bits(bits: u32) -> Self {
        Self::with_capacity(1usize << bits)
    }

    /// Creates a dictionary with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit below `u32::MAX`.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity < NIL as usize,
            "slot dictionary capacity {capacity} does not fit in u32"
        );
        let buckets = capacity.max(1).next_power_of_two();
        Self {
            heads: (0..buckets).map(|_| AtomicU32::new(NIL)).collect(),
            keys: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
            chain: (0..capacity).map(|_| AtomicU32::new(NIL)).collect(),
            live: (0..capacity).map(|_| AtomicBool::new(false)).collect(),
            free: Mutex::new((0..capacity as u32).collect()),
            len: AtomicUsize::new(0),
            bucket_mask: buckets - 1,
        }
    }

    /// Number of hash buckets.
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    fn bucket(&self, key: u64) -> usize {
        let mut hasher = FxHasher::default();
        hasher.write_u64(key);
        hasher.finish() as usize & self.bucket_mask
    }

    fn unlink(&self, idx: usize, bucket: usize) -> bool {
        let target = idx as u32;
        let next = self.chain[idx].load(Ordering::Acquire);
        let head = self.heads[bucket].load(Ordering::Acquire);
        if head == target {
            self.heads[bucket].store(next, Ordering::Release);
            return true;
        }
        let mut current = head;
        let mut steps = 0;
        while current != NIL && steps < self.keys.len() {
            let after = self.chain[current as usize].load(Ordering::Acquire);
            if after == target {
                self.chain[current as usize].store(next, Ordering::Release);
                return true;
            }
            current = after;
            steps += 1;
        }
        false
    }
}

impl SlotDictionary for AtomicSlotDict {
    fn lookup(&self, key: u64) -> Option<SlotId> {
        let bucket = self.bucket(key);
        'walk: loop {
            let mut current = self.heads[bucket].load(Ordering::Acquire);
            let mut steps = 0;
            while current != NIL {
                let idx = current as usize;
                if self.keys[idx].load(Ordering::Acquire) == key {
                    return Some(SlotId(idx));
                }
                let next = self.chain[idx].load(Ordering::Acquire);
                // The key is re-read after the link: a link from a recycled
                // slot is only followed if the slot still belongs here.
                let slot_key = self.keys[idx].load(Ordering::Acquire);
                steps += 1;
                if steps > self.keys.len() || self.bucket(slot_key) != bucket {
                    continue 'walk;
                }
                current = next;
            }
            return None;
        }
    }

    fn insert(&self, key: u64) -> Option<SlotId> {
        if let Some(id) = self.lookup(key) {
            return Some(id);
        }
        let idx = self.free.lock().pop_front()? as usize;
        let bucket = self.bucket(key);
        self.keys[idx].store(key, Ordering::Release);
        self.chain[idx].store(self.heads[bucket].load(Ordering::Acquire), Ordering::Release);
        self.live[idx].store(true, Ordering::Release);
        self.heads[bucket].store(idx as u32, Ordering::Release);
        self.len.fetch_add(1, Ordering::AcqRel);
        Some(SlotId(idx))
    }

    fn delete_id(&self, id: SlotId) -> bool {
        let idx = id.index();
        if !self.live.get(idx).is_some_and(|live| live.load(Ordering::Acquire)) {
            return false;
        }
        let key = self.keys[idx].load(Ordering::Acquire);
        if !self.unlink(idx, self.bucket(key)) {
            debug_assert!(false, "live slot {idx} missing from its bucket chain");
            return false;
        }
        self.live[idx].store(false, Ordering::Release);
        self.free.lock().push_back(idx as u32);
        self.len.fetch_sub(1, Ordering::AcqRel);
        true
    }

    fn key_of(&self, id: SlotId) -> Option<u64> {
        let idx = id.index();
        if !self.live.get(idx)?.load(Ordering::Acquire) {
            return None;
        }
        Some(self.keys[idx].load(Ordering::Acquire))
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }
}

impl fmt::Debug for AtomicSlotDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicSlotDict")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("buckets", &self.bucket_count())
            .finish_non_exhaustive()
    }
}
