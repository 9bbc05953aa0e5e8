//! Optional counters for the LRU map (feature `metrics`).
//!
//! Recording, snapshotting and export are kept apart:
//!
//! ```text
//!   LruMap / LruMapReader ──record──► LruMapMetrics (atomic cells, shared)
//!                                          │
//!                                    snapshot()
//!                                          ▼
//!                               LruMapMetricsSnapshot ──► MetricsExporter
//! ```
//!
//! Counters live next to the slot array so reader handles on other threads can
//! record hits and misses; every cell is a relaxed atomic.

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::LruMapMetrics;
pub use snapshot::LruMapMetricsSnapshot;
pub use traits::{LruMapMetricsRecorder, MetricsExporter, MetricsSnapshotProvider};
