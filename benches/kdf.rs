//! benches/kdf.rs
//! PBKDF2 derivation benchmarks across the algorithm key/IV geometries

use bincrypt::{derive_key_material, Algorithm, Password};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;

fn kdf_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("KDF");
    group.measurement_time(Duration::from_secs(8));
    group.sample_size(50);

    let password = Password::new("benchmark-password").unwrap();
    let salt = [0x42u8; 8];

    // One derivation per algorithm: key_len + block_len output bytes
    for algorithm in Algorithm::ALL {
        let length = algorithm.key_len() + algorithm.block_len();
        let id = BenchmarkId::new("derive_key_iv", algorithm.name());
        group.bench_with_input(id, &length, |b, &length| {
            b.iter(|| {
                let material =
                    derive_key_material(black_box(&password), black_box(&salt), length).unwrap();
                black_box(material);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, kdf_benches);
criterion_main!(benches);
