use std::time::Duration;

use slotlru::builder::LruMapBuilder;
use slotlru::traits::Reclaim;

fn main() {
    env_logger::init();

    // 4 slots, replaced payloads held for 50ms
    let mut map = LruMapBuilder::new(2)
        .reclaim_delay(Duration::from_millis(50))
        .build::<String>();

    for (key, name) in [(1, "alpha"), (2, "beta"), (3, "gamma"), (4, "delta")] {
        map.insert_or_update(key, name.to_string());
    }
    println!("len={} capacity={}", map.len(), map.capacity());
    println!("order (oldest first): {:?}", map.keys_by_recency());

    // reads do not promote; touch does
    let _ = map.get(1);
    map.touch(1);
    println!("after touch(1): {:?}", map.keys_by_recency());

    map.insert_or_update(5, "epsilon".to_string());
    println!("after inserting 5: {:?}", map.keys_by_recency());
    println!("get(2) = {:?}", map.get(2));

    map.insert_or_update_with_handler(5, "EPSILON".to_string(), |old| {
        println!("replaced {old}");
    });
    // the update above evicted the LRU entry first; this one leaves a full map alone
    map.insert_or_update(6, "zeta".to_string());
    map.insert_or_update_evict_on_miss(5, "Epsilon".to_string());
    println!("len after evict-on-miss update: {}", map.len());

    map.insert_or_update_bytes(b"session:abc", "bytes key".to_string());
    println!("get_bytes = {:?}", map.get_bytes(b"session:abc"));

    println!("pending reclaim: {}", map.reclaimer().pending());
    std::thread::sleep(Duration::from_millis(60));
    println!("reclaimed: {}", map.reclaim_expired());
}
