use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rng, seq::SliceRandom};
use std::{collections::HashMap, hint::black_box};
use twin_map::{HashTable, Layout, Map, TreeMap};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn shuffled_keys(size: usize) -> Vec<u64> {
    let mut keys = (0..size as u64).collect::<Vec<_>>();

    keys.shuffle(&mut rng());

    keys
}

fn pairs(keys: &[u64]) -> impl Iterator<Item = (u64, u64)> + '_ {
    keys.iter().map(|&key| (key, key))
}

fn fill<M: Map<u64, u64>>(mut map: M, keys: &[u64]) -> M {
    for &key in keys {
        map.put(key, key);
    }

    map
}

fn insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in SIZES {
        let keys = shuffled_keys(size);

        group.bench_with_input(BenchmarkId::new("tree", size), &keys, |bencher, keys| {
            bencher.iter(|| black_box(fill(TreeMap::new(), keys)));
        });
        group.bench_with_input(
            BenchmarkId::new("hash_table", size),
            &keys,
            |bencher, keys| {
                bencher.iter(|| black_box(fill(HashTable::new(), keys)));
            },
        );
        group.bench_with_input(BenchmarkId::new("std", size), &keys, |bencher, keys| {
            bencher.iter(|| black_box(pairs(keys).collect::<HashMap<_, _>>()));
        });
    }

    group.finish();
}

fn get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let tree = fill(TreeMap::new(), &keys);
        let table = fill(HashTable::new(), &keys);

        group.bench_with_input(BenchmarkId::new("tree", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                for key in keys {
                    black_box(tree.get(key));
                }
            });
        });
        group.bench_with_input(
            BenchmarkId::new("hash_table", size),
            &keys,
            |bencher, keys| {
                bencher.iter(|| {
                    for key in keys {
                        black_box(table.get(key));
                    }
                });
            },
        );
    }

    group.finish();
}

fn iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iterate");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let tree = fill(TreeMap::new(), &keys);
        let table = fill(HashTable::new(), &keys);

        group.bench_function(BenchmarkId::new("tree", size), |bencher| {
            bencher.iter(|| black_box(tree.iter().count()));
        });
        group.bench_function(BenchmarkId::new("hash_table", size), |bencher| {
            bencher.iter(|| black_box(table.iter().count()));
        });
    }

    group.finish();
}

fn build(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("build");

    for size in SIZES {
        let keys = (0..size as u64).collect::<Vec<_>>();

        group.bench_with_input(BenchmarkId::new("balanced", size), &keys, |bencher, keys| {
            bencher.iter(|| black_box(TreeMap::from_pairs(pairs(keys), Layout::Balanced)));
        });
    }

    group.finish();
}

criterion_group!(benches, insert, get, iterate, build);
criterion_main!(benches);
