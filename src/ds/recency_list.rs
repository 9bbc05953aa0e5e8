//! Index-linked recency list over a fixed slot domain.
//!
//! Orders the slot ids `[0, capacity)` from least to most recently accessed
//! using two parallel link arrays instead of heap nodes. Two extra positions
//! past the data slots act as sentinels, so splicing never branches on
//! "is this the first/last element".
//!
//! ## Architecture
//!
//! ```text
//!   index:   0     1     2     3   │  4 (HEAD)   5 (TAIL)     capacity = 4
//!   prev:   [3]  [NIL]  [4]   [2]  │  [NIL]      [0]
//!   next:   [TAIL][NIL] [3]   [0]  │  [2]        [NIL]
//!
//!   HEAD ──► [2] ◄──► [3] ◄──► [0] ◄── TAIL      slot 1 unlinked
//!            oldest            newest
//! ```
//!
//! ## Operations
//! - `access_at(id, ts)`: link at the tail, or move there if already linked
//! - `remove(id)`: unlink and reset bookkeeping
//! - `pop_oldest()`: unlink and return the head
//!
//! ## Performance
//! - every operation except `iter` / `check_invariants`: O(1), no allocation
//!
//! Out-of-range ids are ignored by every operation rather than treated as
//! faults. `debug_validate_invariants()` is available in debug/test builds.

use crate::clock;
use crate::ds::slot_id::SlotId;
use crate::error::InvariantError;

const NIL: u32 = u32::MAX;

/// Largest slot domain a list can index (both sentinels must fit below `NIL`).
pub const MAX_CAPACITY: usize = (u32::MAX - 2) as usize;

/// Recency order over slot ids, least recently used at the head.
#[derive(Debug, Clone)]
pub struct RecencyList {
    prev: Vec<u32>,
    next: Vec<u32>,
    last_access: Vec<i64>,
    capacity: usize,
    len: usize,
}

impl RecencyList {
    /// Creates an empty list over slot ids `[0, capacity)`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= MAX_CAPACITY,
            "recency list capacity {capacity} exceeds {MAX_CAPACITY}"
        );
        let mut list = Self {
            prev: vec![NIL; capacity + 2],
            next: vec![NIL; capacity + 2],
            last_access: vec![0; capacity],
            capacity,
            len: 0,
        };
        let (head, tail) = (list.inner_head(), list.inner_tail());
        list.next[head] = tail as u32;
        list.prev[tail] = head as u32;
        list
    }

    /// Number of linked slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the slot domain.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `id` is currently linked.
    #[inline]
    pub fn contains(&self, id: SlotId) -> bool {
        id.0 < self.capacity && self.is_linked(id.0)
    }

    /// Timestamp of the last access to `id`; 0 if unlinked or out of range.
    #[inline]
    pub fn last_access(&self, id: SlotId) -> i64 {
        self.last_access.get(id.0).copied().unwrap_or(0)
    }

    /// Least recently accessed slot.
    #[inline]
    pub fn head(&self) -> Option<SlotId> {
        if self.len == 0 {
            return None;
        }
        Some(SlotId(self.next[self.inner_head()] as usize))
    }

    /// Most recently accessed slot.
    #[inline]
    pub fn tail(&self) -> Option<SlotId> {
        if self.len == 0 {
            return None;
        }
        Some(SlotId(self.prev[self.inner_tail()] as usize))
    }

    /// Marks `id` as accessed at `timestamp`, moving it to the tail.
    ///
    /// Links `id` if it was not linked yet. Out-of-range ids are ignored.
    pub fn access_at(&mut self, id: SlotId, timestamp: i64) {
        if id.0 >= self.capacity {
            return;
        }
        let idx = id.0;
        self.last_access[idx] = timestamp;
        if self.is_linked(idx) {
            self.unlink(idx);
        } else {
            self.len += 1;
        }
        self.link_back(idx);
    }

    /// [`access_at`](Self::access_at) with the process-wide clock.
    pub fn access(&mut self, id: SlotId) {
        self.access_at(id, clock::now_micros());
    }

    /// Unlinks `id`, resetting its timestamp.
    ///
    /// Returns `false` (and does nothing) if `id` is out of range or not linked.
    pub fn remove(&mut self, id: SlotId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id.0);
        true
    }

    /// Unlinks and returns the least recently accessed slot.
    pub fn pop_oldest(&mut self) -> Option<SlotId> {
        let id = self.head()?;
        self.detach(id.0);
        Some(id)
    }

    /// Iterates linked slots from oldest to newest.
    pub fn iter(&self) -> RecencyIter<'_> {
        RecencyIter {
            list: self,
            current: self.next[self.inner_head()],
            remaining: self.len,
        }
    }

    /// Verifies the chain and the per-slot bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let (head, tail) = (self.inner_head(), self.inner_tail());
        if self.prev[head] != NIL || self.next[tail] != NIL {
            return Err(InvariantError::new("sentinel has an outward link"));
        }

        let mut count = 0usize;
        let mut expected_prev = head;
        let mut current = self.next[head] as usize;
        while current != tail {
            if current >= self.capacity {
                return Err(InvariantError::new(format!(
                    "chain reaches index {current} outside the slot domain"
                )));
            }
            if self.prev[current] as usize != expected_prev {
                return Err(InvariantError::new(format!(
                    "slot {current} has prev {} but follows {expected_prev}",
                    self.prev[current]
                )));
            }
            count += 1;
            if count > self.len {
                return Err(InvariantError::new(format!(
                    "chain longer than element count {}",
                    self.len
                )));
            }
            expected_prev = current;
            current = self.next[current] as usize;
        }
        if self.prev[tail] as usize != expected_prev {
            return Err(InvariantError::new("tail sentinel does not point at newest slot"));
        }
        if count != self.len {
            return Err(InvariantError::new(format!(
                "chain visits {count} slots but element count is {}",
                self.len
            )));
        }

        let mut linked = 0usize;
        for idx in 0..self.capacity {
            match (self.prev[idx] == NIL, self.next[idx] == NIL) {
                (false, false) => linked += 1,
                (true, true) => {
                    if self.last_access[idx] != 0 {
                        return Err(InvariantError::new(format!(
                            "unlinked slot {idx} keeps access time {}",
                            self.last_access[idx]
                        )));
                    }
                },
                _ => {
                    return Err(InvariantError::new(format!(
                        "slot {idx} is half linked"
                    )));
                },
            }
        }
        if linked != self.len {
            return Err(InvariantError::new(format!(
                "{linked} slots carry links but element count is {}",
                self.len
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("recency list invariant violated: {err}");
        }
    }

    #[inline]
    fn inner_head(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn inner_tail(&self) -> usize {
        self.capacity + 1
    }

    #[inline]
    fn is_linked(&self, idx: usize) -> bool {
        self.prev[idx] != NIL && self.next[idx] != NIL
    }

    #[inline]
    fn unlink(&mut self, idx: usize) {
        let prev = self.prev[idx] as usize;
        let next = self.next[idx] as usize;
        self.next[prev] = next as u32;
        self.prev[next] = prev as u32;
        self.prev[idx] = NIL;
        self.next[idx] = NIL;
    }

    #[inline]
    fn link_back(&mut self, idx: usize) {
        let tail = self.inner_tail();
        let last = self.prev[tail] as usize;
        self.next[idx] = tail as u32;
        self.prev[idx] = last as u32;
        self.next[last] = idx as u32;
        self.prev[tail] = idx as u32;
    }

    #[inline]
    fn detach(&mut self, idx: usize) {
        self.unlink(idx);
        self.last_access[idx] = 0;
        self.len -= 1;
    }
}

/// Iterator over linked slot ids from oldest to newest.
pub struct RecencyIter<'a> {
    list: &'a RecencyList,
    current: u32,
    remaining: usize,
}

impl Iterator for RecencyIter<'_> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.current as usize;
        self.current = self.list.next[idx];
        self.remaining -= 1;
        Some(SlotId(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RecencyIter<'_> {}
