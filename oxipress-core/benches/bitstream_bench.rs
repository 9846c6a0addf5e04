//! Throughput benchmarks for the bit reader and writer.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxipress_core::{BitReader, BitWriter};
use std::hint::black_box;

/// Field widths cycled through, similar to a Huffman-coded body.
const WIDTHS: [u8; 8] = [7, 9, 3, 13, 5, 8, 1, 12];

fn encoded(fields: usize) -> Vec<u8> {
    let mut writer = BitWriter::new(Vec::new());
    for i in 0..fields {
        let width = WIDTHS[i % WIDTHS.len()];
        writer
            .write_bits(i as u32, width)
            .expect("writing to a Vec cannot fail");
    }
    writer.finish().expect("writing to a Vec cannot fail")
}

fn bench_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_writer");
    for fields in [1_000usize, 100_000] {
        group.throughput(Throughput::Elements(fields as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), &fields, |b, &n| {
            b.iter(|| black_box(encoded(n)));
        });
    }
    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_reader");
    for fields in [1_000usize, 100_000] {
        let data = encoded(fields);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), &data, |b, data| {
            b.iter(|| {
                let mut reader = BitReader::new(data);
                let mut sum = 0u64;
                for i in 0..fields {
                    let width = WIDTHS[i % WIDTHS.len()];
                    sum += reader.read_bits(width).expect("input is complete") as u64;
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_writer, bench_reader);
criterion_main!(benches);
