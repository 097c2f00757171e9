use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Put(u16, u32),
    Remove(u16),
    Get(u16),
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // A narrow key space makes replacements and removals of present keys common.
    0u16..256
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();

    prop::collection::vec(
        prop_oneof![
            50 => (key.clone(), any::<u32>()).prop_map(|(key, value)| Op::Put(key, value)),
            30 => key.clone().prop_map(Op::Remove),
            20 => key.prop_map(Op::Get),
        ],
        0..512,
    )
}

fn check_equivalence<M: Map<u16, u32>>(mut map: M, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model = BTreeMap::new();

    for op in ops {
        match op {
            Op::Put(key, value) => {
                prop_assert_eq!(map.put(key, value), model.insert(key, value));
            }
            Op::Remove(key) => {
                prop_assert_eq!(map.remove(&key), model.remove(&key));
                prop_assert_eq!(map.get(&key), None);
            }
            Op::Get(key) => {
                prop_assert_eq!(map.get(&key), model.get(&key));
            }
        }

        prop_assert_eq!(map.len(), model.len());
        prop_assert_eq!(map.is_empty(), model.is_empty());
    }

    let mut entries = map
        .iter()
        .map(|(key, value)| (*key, *value))
        .collect::<Vec<_>>();

    prop_assert_eq!(entries.len(), model.len());
    entries.sort_unstable();
    prop_assert_eq!(entries, model.into_iter().collect::<Vec<_>>());

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_equivalence(ops in ops_strategy()) {
        check_equivalence(TreeMap::new(), ops)?;
    }

    #[test]
    fn prop_hash_table_equivalence(ops in ops_strategy()) {
        check_equivalence(HashTable::new(), ops)?;
    }

    #[test]
    fn prop_tree_inorder_is_ascending(keys in prop::collection::vec(any::<i32>(), 0..256)) {
        let tree = keys.iter().map(|&key| (key, ())).collect::<TreeMap<_, _>>();
        let sorted = tree.iter().map(|(key, _)| *key).collect::<Vec<_>>();

        prop_assert!(sorted.windows(2).all(|keys| keys[0] < keys[1]));
        prop_assert_eq!(tree.null_count(), tree.len() + 1);
    }

    #[test]
    fn prop_tree_remove_keeps_others(
        keys in prop::collection::btree_set(any::<i16>(), 1..128),
        index in any::<prop::sample::Index>(),
    ) {
        let keys = keys.into_iter().collect::<Vec<_>>();
        let removed = keys[index.index(keys.len())];
        let mut tree = keys.iter().map(|&key| (key, key as i32 * 3)).collect::<TreeMap<_, _>>();

        prop_assert_eq!(tree.remove(&removed), Some(removed as i32 * 3));
        prop_assert_eq!(tree.len(), keys.len() - 1);
        prop_assert_eq!(tree.get(&removed), None);

        for key in keys.iter().filter(|&&key| key != removed) {
            prop_assert_eq!(tree.get(key), Some(&(*key as i32 * 3)));
        }
    }

    #[test]
    fn prop_balanced_build_height(size in 1usize..2048) {
        let tree = TreeMap::from_pairs((0..size).map(|key| (key, key)), Layout::Balanced).unwrap();

        prop_assert_eq!(tree.height(), size.ilog2() as isize);
        prop_assert_eq!(tree.iter().count(), size);
    }

    #[test]
    fn prop_hash_table_round_trip(keys in prop::collection::hash_set(any::<u64>(), 0..1024)) {
        let table = keys.iter().map(|&key| (key, !key)).collect::<HashTable<_, _>>();

        prop_assert_eq!(table.len(), keys.len());
        prop_assert!(table.load_factor() <= MAX_LOAD_FACTOR);
        prop_assert_eq!(table.iter().count(), keys.len());

        for (key, value) in &table {
            prop_assert!(keys.contains(key));
            prop_assert_eq!(*value, !*key);
        }
    }
}

#[test]
fn exhaustive_remove_order_small_tree() {
    let keys = [4, 2, 6, 1, 3, 5, 7];
    let base = keys
        .iter()
        .map(|&key| (key, key))
        .collect::<TreeMap<_, _>>();

    for first in keys {
        for second in keys.into_iter().filter(|&key| key != first) {
            let mut tree = base.clone();

            assert_eq!(tree.remove(&first), Some(first));
            assert_eq!(tree.remove(&second), Some(second));

            let mut expected = keys
                .into_iter()
                .filter(|&key| key != first && key != second)
                .collect::<Vec<_>>();

            expected.sort_unstable();

            assert_eq!(
                tree.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
                expected
            );
            assert_eq!(tree.height(), 2);
        }
    }
}
