//! Query benchmarks
//!
//! Hits and misses are measured separately: a miss can stop at the first
//! unset slot, a hit always checks all k.

use bloomy::merge::batch_query;
use bloomy::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod common;
use common::*;

fn filled(kind: FilterKind, capacity: u64, items: &[String]) -> Filter {
    let mut filter = Filter::create(kind, capacity, &FilterOptions::default()).unwrap();
    filter.add_all(items.iter());
    filter
}

fn bench_query_hit_vs_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_hit_vs_miss");
    let members = generate_strings(10_000, 32);
    let outsiders = generate_strings(10_000, 31);

    for kind in [FilterKind::Standard, FilterKind::Counting, FilterKind::Scalable] {
        let filter = filled(kind, 10_000, &members);

        group.bench_function(BenchmarkId::new("hit", kind), |b| {
            let mut idx = 0;
            b.iter(|| {
                let hit = filter.query(black_box(&members[idx % members.len()]));
                idx += 1;
                hit
            });
        });

        group.bench_function(BenchmarkId::new("miss", kind), |b| {
            let mut idx = 0;
            b.iter(|| {
                let hit = filter.query(black_box(&outsiders[idx % outsiders.len()]));
                idx += 1;
                hit
            });
        });
    }

    group.finish();
}

fn bench_query_scalable_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_scalable_depth");
    let lookups = generate_strings(1_000, 16);

    // More items per initial capacity means more slices to walk on a miss.
    for &items in &[1_000_usize, 10_000, 100_000] {
        let data = generate_strings(items, 16);
        let filter = filled(FilterKind::Scalable, 1_000, &data);

        group.bench_with_input(BenchmarkId::from_parameter(items), &filter, |b, filter| {
            let mut idx = 0;
            b.iter(|| {
                let hit = filter.query(black_box(&lookups[idx % lookups.len()]));
                idx += 1;
                hit
            });
        });
    }

    group.finish();
}

fn bench_batch_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_query");
    let members = generate_u64s(100_000);
    let mut filter = StandardBloomFilter::new(100_000, 0.01).unwrap();
    filter.add_all(members.iter());

    for &batch in &[100_usize, 1_000, 10_000] {
        let lookups = &members[..batch];
        group.throughput(Throughput::Elements(batch as u64));

        group.bench_with_input(BenchmarkId::new("query_batch", batch), lookups, |b, lookups| {
            b.iter(|| filter.query_batch(black_box(lookups)));
        });
        group.bench_with_input(BenchmarkId::new("batch_query_map", batch), lookups, |b, lookups| {
            b.iter(|| batch_query(&filter, black_box(lookups)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query_hit_vs_miss,
    bench_query_scalable_depth,
    bench_batch_query
);
criterion_main!(benches);
