use std::fmt;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{thread_rng, Rng};

use splay_index::{Aggregate, CompactSplay, DynamicSplay, SplayTree, TreeItem};

#[derive(Clone)]
struct Entry {
    key: String,
    rank: u64,
}

fn entry(rank: u64) -> Entry {
    Entry {
        key: rank.to_string(),
        rank,
    }
}

#[derive(Clone)]
struct SubtreeCount(usize);

impl Aggregate for SubtreeCount {
    fn maintain(&mut self, left: Option<&Self>, right: Option<&Self>) {
        self.0 = 1 + left.map_or(0, |l| l.0) + right.map_or(0, |r| r.0);
    }
}

impl fmt::Display for SubtreeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl TreeItem for Entry {
    type Aggregate = SubtreeCount;

    fn key(&self) -> &str {
        &self.key
    }

    fn sorts_after(&self, other: &Self) -> bool {
        self.rank > other.rank
    }

    fn make_aggregate(&self) -> SubtreeCount {
        SubtreeCount(1)
    }
}

fn filled<S: SplayTree<Entry>>(mut tree: S, n: u64) -> S {
    for rank in 0..n {
        tree.insert(entry(rank));
    }
    tree
}

pub fn seq_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_insert");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dynamic", |b| {
        let mut tree = DynamicSplay::new();
        let mut rank = 0u64;
        b.iter(|| {
            tree.insert(entry(rank));
            rank += 1;
        })
    });

    group.bench_function("compact", |b| {
        let mut tree = CompactSplay::new();
        let mut rank = 0u64;
        b.iter(|| {
            tree.insert(entry(rank));
            rank += 1;
        })
    });

    group.finish();
}

pub fn rand_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_get");
    group.throughput(Throughput::Elements(1));
    let keys: Vec<String> = (0..10_000u64).map(|r| r.to_string()).collect();

    group.bench_function("dynamic", |b| {
        let tree = filled(DynamicSplay::new(), 10_000);
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            tree.get(key)
        })
    });

    group.bench_function("compact", |b| {
        let tree = filled(CompactSplay::new(), 10_000);
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            tree.get(key)
        })
    });

    group.finish();
}

pub fn seq_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_delete");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dynamic", |b| {
        b.iter_custom(|iters| {
            let mut tree = filled(DynamicSplay::new(), iters);
            let start = Instant::now();
            for rank in 0..iters {
                tree.remove(&rank.to_string());
            }
            start.elapsed()
        })
    });

    group.bench_function("compact", |b| {
        b.iter_custom(|iters| {
            let mut tree = filled(CompactSplay::new(), iters);
            let start = Instant::now();
            for rank in 0..iters {
                tree.remove(&rank.to_string());
            }
            start.elapsed()
        })
    });

    group.finish();
}

pub fn rand_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_partition");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dynamic", |b| {
        let mut tree = filled(DynamicSplay::new(), 10_000);
        let mut rng = thread_rng();
        b.iter(|| {
            let probe = entry(rng.gen_range(0..10_000));
            tree.partition(&probe).is_some()
        })
    });

    group.bench_function("compact", |b| {
        let mut tree = filled(CompactSplay::new(), 10_000);
        let mut rng = thread_rng();
        b.iter(|| {
            let probe = entry(rng.gen_range(0..10_000));
            tree.partition(&probe).is_some()
        })
    });

    group.finish();
}

criterion_group!(benches, seq_insert, rand_get, seq_delete, rand_partition);
criterion_main!(benches);
