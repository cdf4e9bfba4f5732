//! Insert benchmarks
//!
//! 1. **By Size**: standard filter insert latency from 1K to 1M capacity
//! 2. **By False Positive Rate**: lower rates mean more hash functions
//! 3. **By Variant**: standard vs counting (per width) vs scalable
//! 4. **Scalable Growth**: cost of inserting far past the initial capacity

use bloomy::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod common;
use common::*;

fn bench_insert_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_by_size");
    let items = generate_strings(10_000, 32);

    for &size in SIZES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(format_size(size)), &size, |b, &size| {
            let mut filter = StandardBloomFilter::new(size, 0.01).unwrap();
            let mut idx = 0;
            b.iter(|| {
                filter.add(black_box(&items[idx % items.len()]));
                idx += 1;
            });
        });
    }

    group.finish();
}

fn bench_insert_by_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_by_rate");
    let items = generate_u64s(10_000);

    for &rate in RATES {
        group.bench_with_input(BenchmarkId::from_parameter(rate), &rate, |b, &rate| {
            let mut filter = StandardBloomFilter::new(100_000, rate).unwrap();
            let mut idx = 0;
            b.iter(|| {
                filter.add(black_box(&items[idx % items.len()]));
                idx += 1;
            });
        });
    }

    group.finish();
}

fn bench_insert_by_variant(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_by_variant");
    let items = generate_strings(10_000, 32);

    let variants = [
        ("standard", FilterKind::Standard, CounterWidth::Bits8),
        ("counting_8", FilterKind::Counting, CounterWidth::Bits8),
        ("counting_16", FilterKind::Counting, CounterWidth::Bits16),
        ("counting_32", FilterKind::Counting, CounterWidth::Bits32),
        ("scalable", FilterKind::Scalable, CounterWidth::Bits8),
    ];

    for (name, kind, width) in variants {
        let options = FilterOptions::default().with_counter_width(width);
        group.bench_function(name, |b| {
            let mut filter = Filter::create(kind, 100_000, &options).unwrap();
            let mut idx = 0;
            b.iter(|| {
                filter.add(black_box(&items[idx % items.len()]));
                idx += 1;
            });
        });
    }

    group.finish();
}

fn bench_scalable_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalable_growth");
    let items = generate_u64s(50_000);
    group.throughput(Throughput::Elements(items.len() as u64));

    for &initial in &[100_u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(initial), &initial, |b, &initial| {
            b.iter(|| {
                let mut filter = ScalableBloomFilter::new(initial, 0.01).unwrap();
                filter.add_all(items.iter());
                black_box(filter.slice_count())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_by_size,
    bench_insert_by_rate,
    bench_insert_by_variant,
    bench_scalable_growth
);
criterion_main!(benches);
