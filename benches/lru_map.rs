use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use slotlru::builder::LruMapBuilder;
use slotlru::ds::{RecencyList, SlotId};
use slotlru::policy::LruMap;
use slotlru::reclaim::ImmediateReclaimer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn filled(bits: u32) -> LruMap<u64> {
    let mut map = LruMap::new(bits, Duration::from_millis(1));
    for i in 0..(1u64 << bits) {
        map.insert_or_update(i, i);
    }
    map
}

fn bench_recency_access(c: &mut Criterion) {
    c.bench_function("recency_list_access", |b| {
        b.iter_batched(
            || RecencyList::new(1024),
            |mut list| {
                for i in 0..4096usize {
                    list.access_at(std::hint::black_box(SlotId::new(i % 1024)), i as i64 + 1);
                }
                list
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let map = filled(10);
    c.bench_function("lru_map_get_hit", |b| {
        b.iter(|| {
            for i in 0..1024u64 {
                let _ = std::hint::black_box(map.get(std::hint::black_box(i)));
            }
        })
    });
    c.bench_function("lru_map_get_with_hit", |b| {
        b.iter(|| {
            for i in 0..1024u64 {
                let _ = std::hint::black_box(map.get_with(std::hint::black_box(i), |v| *v));
            }
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let map = filled(10);
    c.bench_function("lru_map_get_miss", |b| {
        b.iter(|| {
            for i in 0..1024u64 {
                let _ = std::hint::black_box(map.get(std::hint::black_box(i + 1_000_000)));
            }
        })
    });
}

fn bench_update_in_place(c: &mut Criterion) {
    c.bench_function("lru_map_update_full_map", |b| {
        b.iter_batched(
            || filled(10),
            |mut map| {
                for i in 0..1024u64 {
                    map.insert_or_update(std::hint::black_box(i), i + 1);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("lru_map_update_in_place_evict_on_miss", |b| {
        b.iter_batched(
            || filled(10),
            |mut map| {
                for i in 0..1024u64 {
                    map.insert_or_update_evict_on_miss(std::hint::black_box(i), i + 1);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("lru_map_eviction_churn_delayed", |b| {
        b.iter_batched(
            || filled(10),
            |mut map| {
                for i in 0..4096u64 {
                    map.insert_or_update(std::hint::black_box(10_000 + i), i);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("lru_map_eviction_churn_immediate", |b| {
        b.iter_batched(
            || {
                let mut map: LruMap<u64, _, ImmediateReclaimer> =
                    LruMapBuilder::new(10).build_with_reclaimer(Arc::new(ImmediateReclaimer));
                for i in 0..1024u64 {
                    map.insert_or_update(i, i);
                }
                map
            },
            |mut map| {
                for i in 0..4096u64 {
                    map.insert_or_update(std::hint::black_box(10_000 + i), i);
                }
                map
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_under_writer(c: &mut Criterion) {
    let mut map = filled(10);
    let reader = map.reader();
    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut i = 0u64;
            while !stop.load(Ordering::Relaxed) {
                map.insert_or_update(i % 2048, i);
                i += 1;
            }
        })
    };

    c.bench_function("lru_map_reader_get_under_writer", |b| {
        b.iter(|| {
            for i in 0..1024u64 {
                let _ = std::hint::black_box(reader.get(std::hint::black_box(i)));
            }
        })
    });

    stop.store(true, Ordering::Relaxed);
    let _ = writer.join();
}

criterion_group!(
    benches,
    bench_recency_access,
    bench_get_hit,
    bench_get_miss,
    bench_update_in_place,
    bench_eviction_churn,
    bench_get_under_writer
);
criterion_main!(benches);
