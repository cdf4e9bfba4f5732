//! Property-based tests for filter invariants.

use bloomy::core::CounterStore;
use bloomy::hash::HashEngine;
use bloomy::prelude::*;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = FilterKind> {
    prop_oneof![
        Just(FilterKind::Standard),
        Just(FilterKind::Counting),
        Just(FilterKind::Scalable),
    ]
}

fn width_strategy() -> impl Strategy<Value = CounterWidth> {
    prop_oneof![
        Just(CounterWidth::Bits8),
        Just(CounterWidth::Bits16),
        Just(CounterWidth::Bits32),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_no_false_negatives(
        kind in kind_strategy(),
        items in prop::collection::vec(any::<Vec<u8>>(), 1..200),
    ) {
        let mut filter = Filter::create(kind, 50, &FilterOptions::default()).unwrap();
        for item in &items {
            filter.add(item);
        }
        for item in &items {
            prop_assert!(filter.query(item));
        }
    }

    #[test]
    fn prop_hash_deterministic_and_in_range(
        bytes in any::<Vec<u8>>(),
        k in 1u32..=100,
        m in 1u64..=1_000_000,
    ) {
        let first = HashEngine::hash(&bytes, k, m);
        let second = HashEngine::hash(&bytes, k, m);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), k as usize);
        prop_assert!(first.iter().all(|&index| index < m));
    }

    #[test]
    fn prop_counters_saturate(width in width_strategy(), bumps in 0usize..600) {
        let mut store = CounterStore::new(4, width).unwrap();
        for _ in 0..bumps {
            store.increment([1]);
        }
        let expected = (bumps as u64).min(u64::from(store.max_value())) as u32;
        prop_assert_eq!(store.get(1), expected);

        store.decrement([0]);
        prop_assert_eq!(store.get(0), 0);
    }

    #[test]
    fn prop_union_is_membership_monotonic(
        left in prop::collection::vec(any::<u64>(), 0..100),
        right in prop::collection::vec(any::<u64>(), 0..100),
    ) {
        let mut a = StandardBloomFilter::new(500, 0.01).unwrap();
        let mut b = StandardBloomFilter::new(500, 0.01).unwrap();
        a.add_all(left.iter());
        b.add_all(right.iter());

        let merged = a.union(&b).unwrap();
        for item in left.iter().chain(right.iter()) {
            prop_assert!(merged.query(item));
        }
    }

    #[test]
    fn prop_wire_round_trip(
        kind in kind_strategy(),
        compress in any::<bool>(),
        items in prop::collection::vec("[a-z0-9]{1,12}", 0..150),
        lookups in prop::collection::vec("[a-z0-9]{1,12}", 0..50),
    ) {
        let mut filter = Filter::create(kind, 40, &FilterOptions::default()).unwrap();
        filter.add_all(items.iter());

        let restored = Filter::from_bytes(&filter.to_bytes(compress).unwrap()).unwrap();
        prop_assert_eq!(restored.info(), filter.info());
        for lookup in items.iter().chain(lookups.iter()) {
            prop_assert_eq!(restored.query(lookup), filter.query(lookup));
        }
    }

    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Filter::from_bytes(&bytes);
    }
}
