use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::LruMapMetricsSnapshot;
use crate::metrics::traits::LruMapMetricsRecorder;

#[derive(Debug, Default)]
pub struct LruMapMetrics {
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub insert_new: MetricsCell,
    pub insert_updates: MetricsCell,
    pub evicted_entries: MetricsCell,
    pub removes: MetricsCell,
    pub touches: MetricsCell,
    pub handler_calls: MetricsCell,
    pub immediate_drops: MetricsCell,
}

impl LruMapMetrics {
    /// Captures the counters plus the gauges supplied by the caller.
    pub fn snapshot(&self, len: usize, capacity: usize) -> LruMapMetricsSnapshot {
        let get_hits = self.get_hits.get();
        let get_misses = self.get_misses.get();
        let insert_new = self.insert_new.get();
        let insert_updates = self.insert_updates.get();
        LruMapMetricsSnapshot {
            get_calls: get_hits + get_misses,
            get_hits,
            get_misses,
            insert_calls: insert_new + insert_updates,
            insert_new,
            insert_updates,
            evicted_entries: self.evicted_entries.get(),
            removes: self.removes.get(),
            touches: self.touches.get(),
            handler_calls: self.handler_calls.get(),
            immediate_drops: self.immediate_drops.get(),
            len,
            capacity,
        }
    }

    pub fn reset(&self) {
        for cell in [
            &self.get_hits,
            &self.get_misses,
            &self.insert_new,
            &self.insert_updates,
            &self.evicted_entries,
            &self.removes,
            &self.touches,
            &self.handler_calls,
            &self.immediate_drops,
        ] {
            cell.reset();
        }
    }
}

impl LruMapMetricsRecorder for LruMapMetrics {
    #[inline]
    fn record_get_hit(&self) {
        self.get_hits.incr();
    }

    #[inline]
    fn record_get_miss(&self) {
        self.get_misses.incr();
    }

    #[inline]
    fn record_insert_new(&self) {
        self.insert_new.incr();
    }

    #[inline]
    fn record_insert_update(&self) {
        self.insert_updates.incr();
    }

    #[inline]
    fn record_evicted_entry(&self) {
        self.evicted_entries.incr();
    }

    #[inline]
    fn record_remove(&self) {
        self.removes.incr();
    }

    #[inline]
    fn record_touch(&self) {
        self.touches.incr();
    }

    #[inline]
    fn record_handler_call(&self) {
        self.handler_calls.incr();
    }

    #[inline]
    fn record_immediate_drop(&self) {
        self.immediate_drops.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_derives_call_totals() {
        let metrics = LruMapMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_hit();
        metrics.record_get_miss();
        metrics.record_insert_new();
        metrics.record_insert_update();
        metrics.record_evicted_entry();

        let snap = metrics.snapshot(3, 8);
        assert_eq!(snap.get_calls, 3);
        assert_eq!(snap.get_hits, 2);
        assert_eq!(snap.insert_calls, 2);
        assert_eq!(snap.evicted_entries, 1);
        assert_eq!(snap.len, 3);
        assert_eq!(snap.capacity, 8);

        metrics.reset();
        assert_eq!(metrics.snapshot(0, 8).get_calls, 0);
    }
}
