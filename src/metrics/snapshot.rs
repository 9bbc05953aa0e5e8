#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMapMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub removes: u64,
    pub touches: u64,
    pub handler_calls: u64,
    pub immediate_drops: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl LruMapMetricsSnapshot {
    /// Fraction of `get` calls that hit, or 0.0 before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            return 0.0;
        }
        self.get_hits as f64 / self.get_calls as f64
    }
}
