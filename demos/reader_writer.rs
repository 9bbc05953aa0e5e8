use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use slotlru::policy::LruMap;

fn main() {
    env_logger::init();

    let mut map: LruMap<Vec<u8>> = LruMap::new(8, Duration::from_millis(20));
    let keys = map.capacity() as u64 * 2;
    let stop = Arc::new(AtomicBool::new(false));
    let hits = Arc::new(AtomicU64::new(0));
    let misses = Arc::new(AtomicU64::new(0));

    let readers: Vec<_> = (0..4)
        .map(|r| {
            let reader = map.reader();
            let stop = Arc::clone(&stop);
            let hits = Arc::clone(&hits);
            let misses = Arc::clone(&misses);
            thread::spawn(move || {
                let mut key = r;
                while !stop.load(Ordering::Relaxed) {
                    match reader.get_with(key % keys, |bytes| bytes.len()) {
                        Some(_) => hits.fetch_add(1, Ordering::Relaxed),
                        None => misses.fetch_add(1, Ordering::Relaxed),
                    };
                    key = key.wrapping_add(7);
                }
            })
        })
        .collect();

    for round in 0..200_000u64 {
        let key = round % keys;
        map.insert_or_update(key, key.to_le_bytes().to_vec());
    }
    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        let _ = reader.join();
    }

    println!(
        "len={} hits={} misses={} reclaimed={}",
        map.len(),
        hits.load(Ordering::Relaxed),
        misses.load(Ordering::Relaxed),
        map.reclaim_expired()
    );
}
