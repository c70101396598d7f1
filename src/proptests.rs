use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_tree<K: Ord + std::fmt::Debug, V>(t: &BstMap<K, V>) {
    // Every node's key must lie strictly between the bounds inherited from
    // its ancestors, so keys are unique and in-order traversal is ascending.
    fn walk<'a, K: Ord + std::fmt::Debug, V>(
        node: &'a Node<K, V>,
        lo: Option<&'a K>,
        hi: Option<&'a K>,
        count: &mut usize,
    ) {
        if let Some(lo) = lo {
            assert!(
                node.key > *lo,
                "key {:?} violates lower bound {:?}",
                node.key,
                lo
            );
        }
        if let Some(hi) = hi {
            assert!(
                node.key < *hi,
                "key {:?} violates upper bound {:?}",
                node.key,
                hi
            );
        }
        *count += 1;
        if let Some(left) = node.left.as_deref() {
            walk(left, lo, Some(&node.key), count);
        }
        if let Some(right) = node.right.as_deref() {
            walk(right, Some(&node.key), hi, count);
        }
    }

    let mut count = 0usize;
    if let Some(root) = t.root.as_deref() {
        walk(root, None, None, &mut count);
    }
    assert_eq!(count, t.len(), "reachable node count must match BstMap::len");

    let keys: Vec<&K> = t.keys().collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "in-order traversal must be strictly ascending"
    );
}

#[derive(Clone, Debug)]
enum Op<K> {
    Insert(K, u64),
    Remove(K),
    Get(K),
}

fn ops_strategy_i32() -> impl Strategy<Value = Vec<Op<i32>>> {
    // A narrow key range keeps collisions (updates, successful removes)
    // frequent.
    let key = 0i32..64;
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        25 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=2000)
}

fn ops_strategy_string() -> impl Strategy<Value = Vec<Op<String>>> {
    let op = prop_oneof![
        50 => ("[a-d]{0,6}", any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => "[a-d]{0,6}".prop_map(Op::Remove),
        25 => "[a-d]{0,6}".prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=2000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_i32(ops in ops_strategy_i32()) {
        let mut t: BstMap<i32, u64> = BstMap::new();
        let mut m: BTreeMap<i32, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => prop_assert_eq!(t.insert(k, v), m.insert(k, v)),
                Op::Remove(k) => prop_assert_eq!(t.remove(&k), m.remove(&k)),
                Op::Get(k) => prop_assert_eq!(t.get(&k), m.get(&k)),
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(i32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_equivalence_string_keys(ops in ops_strategy_string()) {
        let mut t: BstMap<String, u64> = BstMap::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => prop_assert_eq!(t.insert(k.clone(), v), m.insert(k, v)),
                Op::Remove(k) => prop_assert_eq!(t.remove(k.as_str()), m.remove(&k)),
                Op::Get(k) => prop_assert_eq!(t.get(k.as_str()), m.get(&k)),
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);

        // The owning iterator must agree with the borrowing one.
        let borrowed: Vec<(String, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let owned: Vec<(String, u64)> = t.into_iter().collect();
        prop_assert_eq!(&owned, &borrowed);
        let expected: Vec<(String, u64)> = m.into_iter().collect();
        prop_assert_eq!(owned, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = [5i32, 3, 8, 1, 4, 7, 9];

    for_each_permutation(&keys, |perm| {
        let mut t: BstMap<i32, u64> = BstMap::new();
        let mut m: BTreeMap<i32, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k, v), m.insert(k, v));
        }

        validate_tree(&t);
        let got: Vec<(i32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = [5i32, 3, 8, 1, 4, 7, 9];

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: BstMap<i32, u64> = BstMap::new();
    let mut base_map: BTreeMap<i32, u64> = BTreeMap::new();
    for (i, &k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_tree.insert(k, v), base_map.insert(k, v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
}
