//! Property tests for the red-black priority tree.

use junction::priority_tree::{NodeId, PriorityTree};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(f64),
    /// Index into the currently live handles, taken modulo their count.
    Delete(usize),
}

/// Scores drawn from a tiny pool so ties are the common case, mixed with a
/// wide continuous range.
fn score() -> impl Strategy<Value = f64> {
    prop_oneof![
        3 => (0u8..6).prop_map(f64::from),
        1 => -1000.0f64..1000.0,
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => score().prop_map(Op::Insert),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

fn height_bound(n: usize) -> usize {
    (2.0 * ((n + 1) as f64).log2()).ceil() as usize
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_op(ops in proptest::collection::vec(op(), 1..200)) {
        let mut tree = PriorityTree::new();
        let mut live: Vec<(NodeId, f64, usize)> = Vec::new();
        for (i, op) in ops.into_iter().enumerate() {
            match op {
                Op::Insert(key) => {
                    let id = tree.insert(key, i);
                    live.push((id, key, i));
                }
                Op::Delete(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (id, key, value) = live.remove(pick % live.len());
                    prop_assert_eq!(tree.delete(id), Some((key, value)));
                }
            }
            prop_assert!(tree.verify().is_ok(), "{:?}", tree.verify());
            prop_assert_eq!(tree.len(), live.len());
            prop_assert!(tree.height() <= height_bound(tree.len()));
        }
    }

    #[test]
    fn prop_maximum_is_largest_score(keys in proptest::collection::vec(score(), 1..100)) {
        let mut tree = PriorityTree::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i);
        }
        let max = keys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let top = tree.maximum().and_then(|id| tree.get(id));
        prop_assert_eq!(top.map(|(k, _)| k), Some(max));

        // Ties resolve to the last inserted of the maximal keys.
        let last_max = keys.iter().rposition(|&k| k == max);
        prop_assert_eq!(tree.find_maximum().copied(), last_max);
    }

    #[test]
    fn prop_in_order_is_stable_sort(keys in proptest::collection::vec(score(), 0..100)) {
        let mut tree = PriorityTree::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i);
        }
        let mut expected: Vec<(f64, usize)> = keys.iter().cloned().zip(0..).collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0));
        let walked: Vec<(f64, usize)> = tree.iter().map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn prop_rebuild_is_deterministic(keys in proptest::collection::vec(score(), 1..50)) {
        let mut tree = PriorityTree::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i);
        }
        let first: Vec<(f64, usize)> = tree.iter().map(|(k, v)| (k, *v)).collect();
        let first_max = tree.find_maximum().copied();

        tree.clear();
        prop_assert!(tree.is_empty());
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i);
        }
        let second: Vec<(f64, usize)> = tree.iter().map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first_max, tree.find_maximum().copied());
    }

    #[test]
    fn prop_maximum_ignores_insertion_order(mut keys in proptest::collection::vec(-500i32..500, 1..60)) {
        keys.sort_unstable();
        keys.dedup();
        let mut forward = PriorityTree::new();
        let mut backward = PriorityTree::new();
        for &k in &keys {
            forward.insert(f64::from(k), k);
        }
        for &k in keys.iter().rev() {
            backward.insert(f64::from(k), k);
        }
        prop_assert_eq!(forward.find_maximum(), backward.find_maximum());
        prop_assert_eq!(forward.find_maximum().copied(), keys.last().copied());
    }
}
