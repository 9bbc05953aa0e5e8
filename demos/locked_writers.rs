use std::thread;
use std::time::Duration;

use slotlru::policy::ConcurrentLruMap;

fn main() {
    env_logger::init();

    let map: ConcurrentLruMap<String> = ConcurrentLruMap::with_bits(6, Duration::from_millis(10));

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let map = map.clone();
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    map.insert_or_update(t * 1_000 + i, format!("writer {t} item {i}"));
                }
            })
        })
        .collect();
    for w in writers {
        let _ = w.join();
    }

    let mut live = Vec::new();
    map.get_all(&mut live);
    println!("len={} capacity={} live={}", map.len(), map.capacity(), live.len());
    println!("lru = {:?}", map.peek_lru());
    println!("mru = {:?}", map.peek_mru());
}
