//! Recording, snapshot and export seams for map metrics.
//!
//! Recorders take `&self`: the map's counters are shared with reader handles,
//! so every method goes through interior mutability.

/// Counters updated by the map's reader and writer paths.
pub trait LruMapMetricsRecorder {
    fn record_get_hit(&self);
    fn record_get_miss(&self);
    fn record_insert_new(&self);
    fn record_insert_update(&self);
    fn record_evicted_entry(&self);
    fn record_remove(&self);
    fn record_touch(&self);
    fn record_handler_call(&self);
    fn record_immediate_drop(&self);
}

/// Point-in-time view of a metrics source (bench/test).
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes snapshots to a monitoring system.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
