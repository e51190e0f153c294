// benches/roundtrip.rs
//! Round-trip (encrypt then decrypt) benchmarks for stream sessions and the
//! single-value facade

use bincrypt::{Algorithm, Encryption, Value, ValueKind};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::io::Cursor;

// --- Size constants ---
const KB: usize = 1024;
const MB: usize = 1024 * 1024;

fn format_size(bytes: usize) -> String {
    if bytes >= MB {
        format!("{} MiB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KiB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

fn bench_stream_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_roundtrip");
    let ctx = Encryption::new("benchmark-password", Algorithm::Aes).unwrap();

    let sizes = [KB, 64 * KB, MB];

    for &size in &sizes {
        let payload = vec![0x41u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("bytes", format_size(size)),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut writer = ctx.open_writer(Vec::with_capacity(size + 64)).unwrap();
                    writer.write_bytes(black_box(&payload)).unwrap();
                    let stream = writer.finish().unwrap();

                    let mut reader = ctx.open_reader(Cursor::new(stream)).unwrap();
                    black_box(reader.read_bytes().unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_value_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_sequence");
    let ctx = Encryption::new("benchmark-password", Algorithm::Aes).unwrap();

    let count = 1_000u32;
    group.throughput(Throughput::Elements(count as u64));
    group.bench_function(BenchmarkId::new("i32", count), |b| {
        b.iter(|| {
            let mut writer = ctx.open_writer(Vec::with_capacity(4 * count as usize)).unwrap();
            for i in 0..count {
                writer.write_i32(black_box(i as i32)).unwrap();
            }
            let stream = writer.finish().unwrap();

            let mut reader = ctx.open_reader(Cursor::new(stream)).unwrap();
            for _ in 0..count {
                black_box(reader.read_i32().unwrap());
            }
        });
    });

    group.finish();
}

fn bench_value_facade(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_facade");

    for algorithm in Algorithm::ALL {
        let ctx = Encryption::new("benchmark-password", algorithm).unwrap();
        let id = BenchmarkId::new("i32", algorithm.name());
        group.bench_with_input(id, &ctx, |b, ctx| {
            b.iter(|| {
                let encrypted = ctx.encrypt_value(black_box(&Value::I32(55))).unwrap();
                black_box(ctx.decrypt_value(&encrypted, ValueKind::I32).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stream_roundtrip, bench_value_sequence, bench_value_facade);
criterion_main!(benches);
