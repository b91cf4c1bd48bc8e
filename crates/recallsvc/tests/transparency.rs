//! Caching must never change what the services return.

use proptest::prelude::*;
use recallkit::{AdjustingTree, KeyedCache};
use recallsvc::{fib_iterative, memo_fib, RangeSumService};

#[derive(Clone, Debug)]
enum Query {
    Range(usize, usize),
    Update(usize, i64),
}

fn workload(len: usize) -> impl Strategy<Value = Vec<Query>> {
    let query = prop_oneof![
        (0..len, 0..len).prop_map(|(a, b)| Query::Range(a.min(b), a.max(b))),
        (0..len, -1000i64..1000).prop_map(|(i, v)| Query::Update(i, v)),
    ];
    prop::collection::vec(query, 0..150)
}

fn array_and_workload() -> impl Strategy<Value = (Vec<i64>, Vec<Query>)> {
    (1usize..40).prop_flat_map(|len| {
        (prop::collection::vec(-1000i64..1000, len), workload(len))
    })
}

proptest! {
    #[test]
    fn cached_and_uncached_agree((values, queries) in array_and_workload(), capacity in 1usize..16) {
        let mut plain = RangeSumService::new(values.clone());
        let mut cached = RangeSumService::with_capacity(values, capacity).unwrap();

        for query in queries {
            match query {
                Query::Range(l, r) => {
                    prop_assert_eq!(cached.range_sum(l, r).unwrap(), plain.range_sum(l, r).unwrap());
                }
                Query::Update(i, v) => {
                    plain.update(i, v).unwrap();
                    cached.update(i, v).unwrap();
                    let cache = cached.cache().unwrap();
                    for &(l, r) in cache.keys_lru_order() {
                        prop_assert!(!(l <= i && i <= r));
                    }
                }
            }
            prop_assert!(cached.cache().unwrap().len() <= capacity);
        }

        prop_assert_eq!(cached.values(), plain.values());
    }

    // Below three slots the LRU evicts Fibonacci(k - 2) before it is reused.
    #[test]
    fn fib_is_engine_independent(ns in prop::collection::vec(0u64..=950, 1..8), capacity in 3usize..64) {
        let mut tree = AdjustingTree::new();
        let mut cache = KeyedCache::new(capacity).unwrap();

        for n in ns {
            let expected = fib_iterative(n);
            prop_assert_eq!(memo_fib(n, &mut tree), expected.clone());
            prop_assert_eq!(memo_fib(n, &mut cache), expected);
        }
        prop_assert!(tree.check_invariants().is_ok());
    }
}

#[test]
fn range_sum_scenario() {
    let mut svc = RangeSumService::with_capacity(vec![1, 2, 3, 4, 5], 1000).unwrap();

    assert_eq!(svc.range_sum(1, 3).unwrap(), 9);
    svc.update(2, 10).unwrap();
    assert_eq!(svc.range_sum(1, 3).unwrap(), 16);
    assert_eq!(svc.into_values(), vec![1, 2, 10, 4, 5]);
}
