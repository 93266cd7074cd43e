//! Benchmark the generation-ordered LRU cache behind templates and compilers.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlfrag::CacheConfig;
use sqlfrag::cache::LruCache;

fn make_key(i: usize) -> String {
    format!("Statement:{i:032x}")
}

fn filled(capacity: usize, n: usize) -> LruCache<String, u64> {
    let cache = LruCache::new(CacheConfig::new().capacity(capacity));
    for i in 0..n {
        cache.insert_if_absent(make_key(i), i as u64);
    }
    cache
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/hit");

    for capacity in [64, 256, 1024, 8192] {
        let cache = filled(capacity, capacity);
        let hit_key = make_key(capacity / 2);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &hit_key, |b, key| {
            b.iter(|| black_box(cache.get(key.as_str())));
        });
    }

    group.finish();
}

fn bench_cache_miss_and_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/miss_insert");

    for capacity in [64, 256, 1024, 8192] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &cap| {
                let cache = filled(cap, cap);
                let mut counter = cap;
                b.iter(|| {
                    counter += 1;
                    black_box(cache.insert_if_absent(make_key(counter), counter as u64));
                });
            },
        );
    }

    group.finish();
}

fn bench_cache_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/mixed");

    for capacity in [64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &cap| {
                let prefill = cap * 4 / 5;
                let cache = filled(cap, prefill);
                let mut counter = 0usize;
                b.iter(|| {
                    counter += 1;
                    if counter % 5 == 0 {
                        cache.insert_if_absent(make_key(cap + counter), counter as u64);
                    } else {
                        black_box(cache.get(make_key(counter % prefill).as_str()));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cache_hit,
    bench_cache_miss_and_insert,
    bench_cache_mixed_workload
);
criterion_main!(benches);
