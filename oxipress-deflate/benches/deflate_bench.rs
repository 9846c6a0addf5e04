//! Compression and decompression throughput across levels and inputs.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxipress_core::CompressionLevel;
use oxipress_deflate::{compress_with_level, decompress};
use std::hint::black_box;

const SIZE: usize = 64 * 1024;

fn generate_random(size: usize) -> Vec<u8> {
    // Simple LCG random number generator
    let mut seed = 12345u32;
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            (seed >> 16) as u8
        })
        .collect()
}

fn generate_text_like(size: usize) -> Vec<u8> {
    let words = [
        "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog ", "and ",
        "ecology ", "consequences ", "understanding ",
    ];
    let mut data = Vec::with_capacity(size);
    let mut i = 0usize;
    while data.len() < size {
        data.extend_from_slice(words[(i * 7 + i / 3) % words.len()].as_bytes());
        i += 1;
    }
    data.truncate(size);
    data
}

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("random", generate_random(SIZE)),
        ("repeated", vec![0xAA; SIZE]),
        ("text", generate_text_like(SIZE)),
    ]
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(SIZE as u64));
    for (name, data) in inputs() {
        for level in [1u8, 6, 9] {
            let id = BenchmarkId::new(name, level);
            group.bench_with_input(id, &data, |b, data| {
                b.iter(|| {
                    compress_with_level(black_box(data), CompressionLevel::new(level))
                        .expect("in-memory compression cannot fail")
                });
            });
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(SIZE as u64));
    for (name, data) in inputs() {
        let compressed = compress_with_level(&data, CompressionLevel::DEFAULT)
            .expect("in-memory compression cannot fail");
        group.bench_with_input(BenchmarkId::from_parameter(name), &compressed, |b, input| {
            b.iter(|| decompress(black_box(input)).expect("stream is valid"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
