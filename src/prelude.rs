pub use crate::builder::{LruMapBuilder, DEFAULT_RECLAIM_DELAY, MAX_BITS};
pub use crate::clock::{ManualClock, SystemClock};
pub use crate::ds::{AtomicSlotDict, RecencyList, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMapMetricsSnapshot;
#[cfg(feature = "concurrency")]
pub use crate::policy::ConcurrentLruMap;
pub use crate::policy::{hash_key, LruMap, LruMapReader};
pub use crate::reclaim::{DelayedReclaimer, ImmediateReclaimer};
pub use crate::traits::{Clock, Reclaim, SlotDictionary};
