use std::hash::{BuildHasher, Hash};

/// Reduces a key to a slot index in a table of `capacity` buckets.
pub fn slot_index<Q: Hash + ?Sized>(
    build_hasher: &impl BuildHasher,
    key: &Q,
    capacity: usize,
) -> usize {
    // abs(hash) mod capacity over signed hash codes.
    ((build_hasher.hash_one(key) as i64).unsigned_abs() % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::hash_map::DefaultHasher, hash::BuildHasherDefault};

    #[test]
    fn slot_index_is_in_range() {
        let build_hasher = BuildHasherDefault::<DefaultHasher>::default();

        for key in 0..1024 {
            assert!(slot_index(&build_hasher, &key, 101) < 101);
        }
    }

    #[test]
    fn slot_index_is_deterministic() {
        let build_hasher = BuildHasherDefault::<DefaultHasher>::default();

        assert_eq!(
            slot_index(&build_hasher, "foo", 211),
            slot_index(&build_hasher, "foo", 211)
        );
    }
}
