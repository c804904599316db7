//! Property-based tests for the concurrent set using proptest
//!
//! Single-threaded operation sequences are replayed against a `HashMap` model, and the set
//! must agree with the model after every step.

use super::*;
use crate::Error;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Add(u8, i32),
    Peek(u8),
    Pop(u8),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space so that collisions and misses are common
    prop_oneof![
        4 => (0u8..16, any::<i32>()).prop_map(|(k, v)| Op::Add(k, v)),
        2 => (0u8..16).prop_map(Op::Peek),
        3 => (0u8..16).prop_map(Op::Pop),
        1 => Just(Op::Clear),
    ]
}

fn key(k: u8) -> impl Fn() -> String {
    move || format!("k{k}")
}

mod model_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_matches_hashmap_model(
            shard_count in 1usize..8,
            ops in prop::collection::vec(op_strategy(), 1..200)
        ) {
            let set = SetBuilder::new().shard_count(shard_count).build::<i32>();
            let mut model: HashMap<String, i32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Add(k, v) => {
                        let expected = if model.contains_key(&key(k)()) {
                            Err(Error::AlreadyExists { key: key(k)() })
                        } else {
                            model.insert(key(k)(), v);
                            Ok(())
                        };
                        prop_assert_eq!(set.add(key(k), v), expected);
                    }
                    Op::Peek(k) => {
                        let expected = model
                            .get(&key(k)())
                            .copied()
                            .ok_or(Error::KeyNotFound { key: key(k)() });
                        prop_assert_eq!(set.peek(key(k)), expected);
                    }
                    Op::Pop(k) => {
                        let expected = model
                            .remove(&key(k)())
                            .ok_or(Error::KeyNotFound { key: key(k)() });
                        prop_assert_eq!(set.pop(key(k)), expected);
                    }
                    Op::Clear => {
                        set.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(set.count(), model.len());
            }

            let mut snapshot: Vec<i32> = set.iterator().collect();
            let mut expected: Vec<i32> = model.values().copied().collect();
            snapshot.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(snapshot, expected);
        }

        #[test]
        fn test_first_add_wins(values in prop::collection::vec(any::<i64>(), 1..20)) {
            let set = ConcurrentSet::new();
            let mut accepted = 0;

            for &value in &values {
                if set.add(|| "only", value).is_ok() {
                    accepted += 1;
                }
            }

            prop_assert_eq!(accepted, 1);
            prop_assert_eq!(set.peek(|| "only"), Ok(values[0]));
        }
    }
}

mod iterator_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_producer_yields_each_value_once(
            values in prop::collection::hash_set(any::<u32>(), 0..64)
        ) {
            let set = ConcurrentSet::new();
            for &value in &values {
                set.add(move || value.to_string(), value).unwrap();
            }

            let mut iter = set.iterator();
            let mut seen = Vec::new();
            let mut calls = 0;
            loop {
                let (item, last) = iter.next_item();
                calls += 1;
                seen.extend(item);
                if last {
                    break;
                }
            }

            // One call per value, or a single call for an empty snapshot
            prop_assert_eq!(calls, values.len().max(1));
            prop_assert_eq!(seen.len(), values.len());
            prop_assert_eq!(seen.into_iter().collect::<std::collections::HashSet<_>>(), values);
            prop_assert_eq!(iter.next_item(), (None, true));
        }
    }
}

mod concurrent_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_disjoint_writers_all_land(
            num_threads in 2usize..6,
            items_per_thread in 1usize..200
        ) {
            let set = Arc::new(ConcurrentSet::new());

            let handles: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let set = Arc::clone(&set);
                    thread::spawn(move || {
                        for i in 0..items_per_thread {
                            let id = thread_id * items_per_thread + i;
                            set.add(move || id.to_string(), id).unwrap();
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            prop_assert_eq!(set.count(), num_threads * items_per_thread);
            prop_assert_eq!(set.iterator().len(), num_threads * items_per_thread);
        }
    }
}
