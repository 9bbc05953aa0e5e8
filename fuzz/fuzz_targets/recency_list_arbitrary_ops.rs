#![no_main]

use libfuzzer_sys::fuzz_target;
use slotlru::ds::{RecencyList, SlotId};

// Fuzz arbitrary operation sequences on RecencyList
//
// Tests random sequences of access_at, remove, pop_oldest and iteration,
// checking the chain and timestamps against a plain Vec model.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let capacity = usize::from(data[0] % 32) + 1;
    let mut list = RecencyList::new(capacity);
    let mut model: Vec<usize> = Vec::new();
    let mut clock = 0i64;

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let slot = usize::from(data[idx + 1]) % capacity;
        let id = SlotId::new(slot);

        match op {
            0 => {
                // access_at
                clock += 1;
                list.access_at(id, clock);
                model.retain(|&s| s != slot);
                model.push(slot);

                assert_eq!(list.tail(), Some(id));
                assert_eq!(list.last_access(id), clock);
            }
            1 => {
                // remove
                let was_linked = model.contains(&slot);
                model.retain(|&s| s != slot);
                assert_eq!(list.remove(id), was_linked);
                assert!(!list.contains(id));
            }
            2 => {
                // pop_oldest
                let expected = if model.is_empty() {
                    None
                } else {
                    Some(SlotId::new(model.remove(0)))
                };
                assert_eq!(list.pop_oldest(), expected);
            }
            3 => {
                // iteration order
                let order: Vec<usize> = list.iter().map(SlotId::index).collect();
                assert_eq!(order, model);
            }
            _ => unreachable!(),
        }

        assert_eq!(list.len(), model.len());
        assert_eq!(list.head().map(SlotId::index), model.first().copied());
        idx += 2;
    }

    assert!(list.check_invariants().is_ok());
});
