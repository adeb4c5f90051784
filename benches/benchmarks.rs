//! Per-backend primitive benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzkern::chunkset::copy_match;
use lzkern::simd::available_backends;
use lzkern::{Functable, MAX_MATCH};

fn tables() -> Vec<Functable> {
    available_backends()
        .into_iter()
        .map(|b| Functable::for_backend(b).unwrap())
        .collect()
}

fn benchmark_adler32(c: &mut Criterion) {
    let data: Vec<u8> = (0..64 * 1024u32).map(|i| (i * 7) as u8).collect();
    let mut group = c.benchmark_group("adler32");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for ft in tables() {
        group.bench_function(BenchmarkId::from_parameter(ft.backend()), |b| {
            b.iter(|| ft.adler32(1, black_box(&data)));
        });
    }
    group.finish();
}

fn benchmark_compare258(c: &mut Criterion) {
    let a = [0x5Au8; MAX_MATCH];
    let mut b = a;
    b[200] = 0;
    let mut group = c.benchmark_group("compare258");
    group.throughput(Throughput::Bytes(200));
    for ft in tables() {
        group.bench_function(BenchmarkId::from_parameter(ft.backend()), |bench| {
            bench.iter(|| ft.compare258(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

fn benchmark_slide_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("slide_hash");
    for ft in tables() {
        let mut head: Vec<u16> = (0..1u32 << 16).map(|i| i as u16).collect();
        let mut prev: Vec<u16> = (0..1u32 << 15).map(|i| (i * 3) as u16).collect();
        group.bench_function(BenchmarkId::from_parameter(ft.backend()), |b| {
            b.iter(|| ft.slide_hash(black_box(&mut head), black_box(&mut prev), 1 << 15));
        });
    }
    group.finish();
}

fn benchmark_copy_match(c: &mut Criterion) {
    const LEN: usize = 258;
    let mut group = c.benchmark_group("copy_match");
    group.throughput(Throughput::Bytes(LEN as u64));
    for ft in tables() {
        for dist in [1usize, 3, 16, 300] {
            let mut buf: Vec<u8> = (0..dist + LEN + 64).map(|i| i as u8).collect();
            group.bench_with_input(
                BenchmarkId::new(ft.backend().as_str(), dist),
                &dist,
                |b, &dist| b.iter(|| copy_match(&ft, black_box(&mut buf), dist, dist, LEN)),
            );
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_adler32,
    benchmark_compare258,
    benchmark_slide_hash,
    benchmark_copy_match
);
criterion_main!(benches);
