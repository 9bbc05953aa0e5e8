//! Map types built on the recency list, slot dictionary and reclaimer.
//!
//! | Type                 | Writers                 | Readers         |
//! |----------------------|-------------------------|-----------------|
//! | [`LruMap`]           | one, via `&mut self`    | [`LruMapReader`]|
//! | [`ConcurrentLruMap`] | any thread, via a mutex | lock-free       |

#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod lru_map;

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentLruMap;
pub use lru_map::{hash_key, LruMap, LruMapReader};
