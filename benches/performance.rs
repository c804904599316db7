//! Performance benchmarks for syncset
//!
//! This benchmark suite compares `ConcurrentSet` against globally locked standard library
//! maps doing the same check-then-act work.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Barrier, Mutex, RwLock};
use std::time::Duration;
use syncset::{ConcurrentSet, SetBuilder};

// Benchmark configurations
const SMALL_SET_SIZE: usize = 100;
const MEDIUM_SET_SIZE: usize = 1_000;
const LARGE_SET_SIZE: usize = 10_000;

const OPERATIONS_PER_THREAD: usize = 20_000;

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key_{i}")).collect()
}

// Single-threaded Benchmarks

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_single_thread");

    for &size in [SMALL_SET_SIZE, MEDIUM_SET_SIZE, LARGE_SET_SIZE].iter() {
        let keys = keys(size);

        group.bench_with_input(BenchmarkId::new("syncset_add_pop", size), &keys, |b, keys| {
            b.iter(|| {
                let set = ConcurrentSet::with_capacity(keys.len());
                for (i, key) in keys.iter().enumerate() {
                    black_box(set.add(|| key.as_str(), i).is_ok());
                }
                for key in keys {
                    black_box(set.pop(|| key.as_str()).ok());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("mutex_hashmap_add_pop", size), &keys, |b, keys| {
            b.iter(|| {
                let map = Mutex::new(HashMap::with_capacity(keys.len()));
                for (i, key) in keys.iter().enumerate() {
                    let mut map = map.lock().unwrap();
                    if let Entry::Vacant(slot) = map.entry(key.clone()) {
                        black_box(slot.insert(i));
                    }
                }
                for key in keys {
                    black_box(map.lock().unwrap().remove(key));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("syncset_iterator", size), &keys, |b, keys| {
            let set = ConcurrentSet::new();
            for (i, key) in keys.iter().enumerate() {
                set.add(|| key.as_str(), i).unwrap();
            }
            b.iter(|| black_box(set.iterator().count()))
        });
    }

    group.finish();
}

// Concurrent Benchmarks

fn bench_concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_concurrent_mixed");
    group.measurement_time(Duration::from_secs(10));

    for &num_threads in [2, 4, 8].iter() {
        let operations_per_thread = OPERATIONS_PER_THREAD / num_threads;

        for &shards in [1, 16, 64].iter() {
            group.bench_with_input(
                BenchmarkId::new(format!("syncset_{shards}_shards"), num_threads),
                &num_threads,
                |b, &num_threads| {
                    b.iter(|| {
                        let set = SetBuilder::new()
                            .shard_count(shards)
                            .metrics(false)
                            .build::<usize>();
                        let barrier = Barrier::new(num_threads);

                        crossbeam::scope(|scope| {
                            for thread_id in 0..num_threads {
                                let set = &set;
                                let barrier = &barrier;
                                scope.spawn(move |_| {
                                    barrier.wait();
                                    for i in 0..operations_per_thread {
                                        let id = thread_id * operations_per_thread + i;
                                        let key = move || id.to_string();
                                        match i % 3 {
                                            0 => black_box(set.add(key, id).is_ok()),
                                            1 => black_box(set.peek(key).is_ok()),
                                            2 => black_box(set.pop(key).is_ok()),
                                            _ => unreachable!(),
                                        };
                                    }
                                });
                            }
                        })
                        .unwrap();
                    })
                },
            );
        }

        group.bench_with_input(
            BenchmarkId::new("rwlock_hashmap", num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let map = RwLock::new(HashMap::new());
                    let barrier = Barrier::new(num_threads);

                    crossbeam::scope(|scope| {
                        for thread_id in 0..num_threads {
                            let map = &map;
                            let barrier = &barrier;
                            scope.spawn(move |_| {
                                barrier.wait();
                                for i in 0..operations_per_thread {
                                    let id = thread_id * operations_per_thread + i;
                                    let key = id.to_string();
                                    match i % 3 {
                                        0 => {
                                            let mut map = map.write().unwrap();
                                            black_box(map.entry(key).or_insert(id));
                                        }
                                        1 => {
                                            black_box(map.read().unwrap().get(&key).copied());
                                        }
                                        2 => {
                                            black_box(map.write().unwrap().remove(&key));
                                        }
                                        _ => unreachable!(),
                                    }
                                }
                            });
                        }
                    })
                    .unwrap();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_single_thread, bench_concurrent_mixed);

criterion_main!(benches);
