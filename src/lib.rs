//! slotlru: fixed-capacity LRU map with lock-free readers and a single writer.
//!
//! The recency order lives in an index-linked [`RecencyList`](ds::RecencyList)
//! over a fixed slot domain, keys map to slots through a
//! [`SlotDictionary`](traits::SlotDictionary), and replaced payloads are
//! handed to a [`Reclaim`](traits::Reclaim) implementation instead of being
//! dropped on the writer's hot path.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod clock;
pub mod ds;
pub mod error;
pub mod policy;
pub mod reclaim;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
