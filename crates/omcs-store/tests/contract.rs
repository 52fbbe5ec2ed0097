//! Contract tests that MUST pass for every storage strategy.
//!
//! Both strategies have to produce observably identical order for every
//! operation sequence, whatever their backing container does internally.

use omcs_store::{OrderedStore, StorageStrategy, StoreError};
use proptest::prelude::*;

const STRATEGIES: [StorageStrategy; 2] = [StorageStrategy::List, StorageStrategy::Queue];

#[test]
fn insert_then_remove_next_returns_same_item() {
    for strategy in STRATEGIES {
        let mut store = strategy.build(Vec::new());
        store.insert(42);

        assert_eq!(store.remove_next(), Ok(42));
        assert!(store.is_empty());
    }
}

#[test]
fn remove_next_on_empty_fails() {
    for strategy in STRATEGIES {
        let mut store = strategy.build::<i32>(Vec::new());
        assert_eq!(store.remove_next(), Err(StoreError::EmptyCollection));
    }
}

#[test]
fn replace_one_missing_is_a_no_op() {
    for strategy in STRATEGIES {
        let mut store = strategy.build(vec![1, 2, 3]);

        assert_eq!(store.replace_one(&4, 9), Err(StoreError::NotFound));
        assert_eq!(store.snapshot(), vec![1, 2, 3]);
    }
}

#[test]
fn strategies_agree_on_replacement_order() {
    for strategy in STRATEGIES {
        let mut store = strategy.build(vec!["a", "b", "c", "b"]);

        store.replace_one(&"b", "b2").unwrap();
        assert_eq!(store.snapshot(), vec!["a", "b2", "c", "b"]);
    }
}

proptest! {
    #[test]
    fn replace_all_then_iterate_yields_input(
        items in prop::collection::vec(0i32..100, 0..30)
    ) {
        for strategy in STRATEGIES {
            let mut store = strategy.build(Vec::new());
            store.replace_all(items.clone());

            prop_assert_eq!(store.snapshot(), items.clone());
        }
    }

    #[test]
    fn inserts_drain_in_insertion_order(
        items in prop::collection::vec(0i32..100, 0..30)
    ) {
        for strategy in STRATEGIES {
            let mut store = strategy.build(Vec::new());
            for item in &items {
                store.insert(*item);
            }

            let mut drained = Vec::new();
            while let Ok(item) = store.remove_next() {
                drained.push(item);
            }
            prop_assert_eq!(drained, items.clone());
        }
    }

    #[test]
    fn strategies_stay_in_lockstep(
        initial in prop::collection::vec(0i32..10, 0..15),
        inserts in prop::collection::vec(0i32..10, 0..10)
    ) {
        let mut list = StorageStrategy::List.build(initial.clone());
        let mut queue = StorageStrategy::Queue.build(initial);

        for item in inserts {
            list.insert(item);
            queue.insert(item);
        }
        prop_assert_eq!(list.snapshot(), queue.snapshot());

        let (a, b) = (list.remove_next(), queue.remove_next());
        prop_assert_eq!(a, b);
        prop_assert_eq!(list.snapshot(), queue.snapshot());
    }
}
