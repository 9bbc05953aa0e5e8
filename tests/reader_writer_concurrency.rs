// ==============================================
// READER / WRITER CONCURRENCY TESTS (integration)
// ==============================================
//
// One writer thread owns the map while reader handles on other threads look
// keys up without locks. These require multi-threaded execution and cannot
// live inline.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotlru::policy::{LruMap, LruMapReader};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Payload that records its own destruction. A reader that ever observed a
// destroyed payload would see `alive == false` or a mismatched key.
struct Payload {
    key: u64,
    generation: u64,
    alive: AtomicBool,
    drops: Arc<AtomicUsize>,
}

impl Payload {
    fn new(key: u64, generation: u64, drops: &Arc<AtomicUsize>) -> Self {
        Self {
            key,
            generation,
            alive: AtomicBool::new(true),
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for Payload {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn spawn_reader(
    reader: LruMapReader<Payload>,
    keys: u64,
    seed: u64,
    stop: Arc<AtomicBool>,
    barrier: Arc<Barrier>,
) -> thread::JoinHandle<(u64, u64)> {
    thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hits = 0u64;
        let mut misses = 0u64;
        barrier.wait();
        while !stop.load(Ordering::Relaxed) {
            let key = rng.gen_range(0..keys);
            match reader.get(key) {
                Some(payload) => {
                    assert!(payload.alive.load(Ordering::SeqCst), "observed destroyed payload");
                    assert_eq!(payload.key, key, "payload returned under the wrong key");
                    hits += 1;
                },
                None => misses += 1,
            }
        }
        (hits, misses)
    })
}

// ==============================================
// Rotating Keys Larger Than Capacity
// ==============================================

mod rotating_keys {
    use super::*;

    #[test]
    fn readers_never_observe_destroyed_payloads() {
        init_logging();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut map: LruMap<Payload> = LruMap::new(4, Duration::from_millis(20));
        let keys = map.capacity() as u64 * 3;
        let stop = Arc::new(AtomicBool::new(false));
        let barrier = Arc::new(Barrier::new(4));

        let readers: Vec<_> = (0..3)
            .map(|seed| {
                spawn_reader(
                    map.reader(),
                    keys,
                    seed,
                    Arc::clone(&stop),
                    Arc::clone(&barrier),
                )
            })
            .collect();

        barrier.wait();
        for generation in 0..20_000u64 {
            let key = generation % keys;
            map.insert_or_update(key, Payload::new(key, generation, &drops));
            if generation % 1_000 == 0 {
                map.reclaim_expired();
            }
        }
        stop.store(true, Ordering::Relaxed);

        let mut total_hits = 0;
        for reader in readers {
            let (hits, _misses) = reader.join().unwrap();
            total_hits += hits;
        }
        assert!(total_hits > 0, "readers never found a live key");
        assert!(map.len() <= map.capacity());
        map.check_invariants().unwrap();

        drop(map);
        assert_eq!(drops.load(Ordering::SeqCst), 20_000);
    }

    #[test]
    fn readers_see_latest_or_recent_generation() {
        init_logging();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut map: LruMap<Payload> = LruMap::new(2, Duration::from_millis(20));
        let reader = map.reader();
        let latest = Arc::new(AtomicU64::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        // key 0 is rewritten every round and never evicted
        let watcher = {
            let latest = Arc::clone(&latest);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut last_seen = 0;
                while !stop.load(Ordering::Relaxed) {
                    let floor = latest.load(Ordering::Acquire);
                    if let Some(generation) = reader.get_with(0, |p| p.generation) {
                        assert!(generation >= floor, "stale generation {generation} < {floor}");
                        assert!(generation >= last_seen, "generation went backwards");
                        last_seen = generation;
                    }
                }
            })
        };

        for generation in 1..=10_000u64 {
            map.insert_or_update(0, Payload::new(0, generation, &drops));
            latest.store(generation, Ordering::Release);
            map.touch(0);
        }
        stop.store(true, Ordering::Relaxed);
        watcher.join().unwrap();
        assert_eq!(map.get_with(0, |p| p.generation), Some(10_000));
    }
}

// ==============================================
// Writer Teardown
// ==============================================

mod teardown {
    use super::*;

    #[test]
    fn dropping_writer_under_readers_is_safe() {
        init_logging();
        let drops = Arc::new(AtomicUsize::new(0));
        let mut map: LruMap<Payload> = LruMap::new(3, Duration::from_millis(5));
        for key in 0..8 {
            map.insert_or_update(key, Payload::new(key, 0, &drops));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let barrier = Arc::new(Barrier::new(3));
        let readers: Vec<_> = (0..2)
            .map(|seed| {
                spawn_reader(
                    map.reader(),
                    8,
                    100 + seed,
                    Arc::clone(&stop),
                    Arc::clone(&barrier),
                )
            })
            .collect();

        barrier.wait();
        thread::sleep(Duration::from_millis(5));
        drop(map);
        thread::sleep(Duration::from_millis(5));
        stop.store(true, Ordering::Relaxed);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(drops.load(Ordering::SeqCst), 8);
    }
}
