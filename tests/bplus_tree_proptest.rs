//! Property tests: random operation sequences checked against `BTreeMap`.

use std::collections::BTreeMap;

use arena_bptree::{BPlusTree, Error, NOT_FOUND};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(i32, i64),
    Delete(i32),
}

fn op_strategy(key_space: i32) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..key_space, 0i64..1_000_000).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..key_space).prop_map(Op::Delete),
    ]
}

fn apply(tree: &mut BPlusTree, model: &mut BTreeMap<i32, i64>, op: &Op) {
    match *op {
        Op::Insert(key, value) => {
            let result = tree.insert(key, value);
            if model.contains_key(&key) {
                assert_eq!(result, Err(Error::DuplicateKey(key)));
            } else {
                assert_eq!(result, Ok(()));
                model.insert(key, value);
            }
        }
        Op::Delete(key) => {
            let result = tree.delete(key);
            if model.remove(&key).is_some() {
                assert_eq!(result, Ok(()));
            } else {
                assert_eq!(result, Err(Error::KeyNotFound(key)));
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_matches_btreemap(
        order in 3usize..9,
        ops in prop::collection::vec(op_strategy(64), 1..400),
    ) {
        let mut tree = BPlusTree::new(order, None).unwrap();
        let mut model = BTreeMap::new();

        for op in &ops {
            apply(&mut tree, &mut model, op);
        }

        prop_assert!(tree.check_invariants().is_ok(), "{:?}", tree.check_invariants());
        prop_assert_eq!(tree.len(), model.len());

        let scanned: Vec<(i32, i64)> = tree.iter().unwrap().map(|e| e.unwrap()).collect();
        let expected: Vec<(i32, i64)> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(scanned, expected);

        for key in 0..64 {
            let expected = model.get(&key).copied().unwrap_or(NOT_FOUND);
            prop_assert_eq!(tree.search(key).unwrap(), expected);
        }
    }

    #[test]
    fn prop_invariants_hold_after_every_op(
        order in 3usize..6,
        ops in prop::collection::vec(op_strategy(32), 1..150),
    ) {
        let mut tree = BPlusTree::new(order, None).unwrap();
        let mut model = BTreeMap::new();

        for op in &ops {
            apply(&mut tree, &mut model, op);
            prop_assert!(tree.check_invariants().is_ok(), "after {:?}: {:?}", op, tree.check_invariants());
        }
    }

    #[test]
    fn prop_range_matches_btreemap(
        keys in prop::collection::btree_set(-500i32..500, 0..200),
        start in -600i32..600,
        len in 0i32..300,
    ) {
        let mut tree = BPlusTree::new(4, None).unwrap();
        for &key in &keys {
            tree.insert(key, key as i64).unwrap();
        }

        let end = start.saturating_add(len);
        let scanned: Vec<i32> = tree.range(start..end).unwrap().map(|e| e.unwrap().0).collect();
        let expected: Vec<i32> = keys.range(start..end).copied().collect();
        prop_assert_eq!(scanned, expected);
    }

    #[test]
    fn prop_failed_insert_changes_nothing(
        keys in prop::collection::vec(any::<i32>(), 1..100),
        order in 3usize..8,
    ) {
        let mut tree = BPlusTree::new(order, None).unwrap();
        for &key in &keys {
            let _ = tree.insert(key, 1);
        }
        let before: Vec<(i32, i64)> = tree.iter().unwrap().map(|e| e.unwrap()).collect();
        let used = tree.arena_used();

        prop_assert_eq!(tree.insert(keys[0], 2), Err(Error::DuplicateKey(keys[0])));
        prop_assert_eq!(tree.insert(i32::MIN, NOT_FOUND), Err(Error::InvalidValue(NOT_FOUND)));

        let after: Vec<(i32, i64)> = tree.iter().unwrap().map(|e| e.unwrap()).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(tree.arena_used(), used);
    }
}
