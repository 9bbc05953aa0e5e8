#![no_main]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use slotlru::builder::LruMapBuilder;
use slotlru::policy::LruMap;
use slotlru::reclaim::ImmediateReclaimer;

// Fuzz arbitrary operation sequences on LruMap
//
// Tests random sequences of insert_or_update (both eviction modes), touch,
// remove, evict_lru and get against a write-ordered LRU model.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let bits = u32::from(data[0] % 5);
    let mut map: LruMap<u32, _, ImmediateReclaimer> =
        LruMapBuilder::new(bits).build_with_reclaimer(Arc::new(ImmediateReclaimer));
    let capacity = map.capacity();
    let mut order: VecDeque<u64> = VecDeque::new();
    let mut values: HashMap<u64, u32> = HashMap::new();

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 5;
        let key = u64::from(data[idx + 1] % 48);
        let value = u32::from(data[idx + 1]);

        match op {
            0 | 1 => {
                // insert_or_update evicts whenever full,
                // insert_or_update_evict_on_miss only for absent keys
                let on_miss = op == 1;
                let must_evict = values.len() == capacity && !(on_miss && values.contains_key(&key));
                if must_evict {
                    if let Some(oldest) = order.pop_front() {
                        values.remove(&oldest);
                    }
                }
                order.retain(|&k| k != key);
                order.push_back(key);
                values.insert(key, value);
                if on_miss {
                    map.insert_or_update_evict_on_miss(key, value);
                } else {
                    map.insert_or_update(key, value);
                }
                assert_eq!(map.get(key).as_deref(), Some(&value));
            }
            2 => {
                // touch
                let present = values.contains_key(&key);
                if present {
                    order.retain(|&k| k != key);
                    order.push_back(key);
                }
                assert_eq!(map.touch(key), present);
            }
            3 => {
                // remove
                let present = values.remove(&key).is_some();
                order.retain(|&k| k != key);
                assert_eq!(map.remove(key), present);
                assert!(map.get(key).is_none());
            }
            4 => {
                // evict_lru
                let expected = order.pop_front();
                if let Some(k) = expected {
                    values.remove(&k);
                }
                assert_eq!(map.evict_lru(), expected);
            }
            _ => unreachable!(),
        }

        assert_eq!(map.len(), values.len());
        assert!(map.len() <= capacity);
        idx += 2;
    }

    assert_eq!(map.keys_by_recency(), order.into_iter().collect::<Vec<_>>());
    assert!(map.check_invariants().is_ok());
});
