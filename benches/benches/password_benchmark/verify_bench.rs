use std::{hint::black_box, sync::LazyLock};

use authplug::{hash_password, verify, Digest, HashParams};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const PASSWORD: &str = "very_secure_password";

// Заранее сгенерированные записи для разных параметров
static RECORDS: LazyLock<Vec<(String, String)>> = LazyLock::new(|| {
    [(Digest::Sha256, 901), (Digest::Sha256, 10_000), (Digest::Sha512, 901)]
        .into_iter()
        .map(|(digest, iterations)| {
            let params = HashParams {
                digest,
                iterations,
                ..HashParams::default()
            };
            let label = format!("{}/{}", digest.as_str(), iterations);
            (label, hash_password(PASSWORD, &params).expect("hash"))
        })
        .collect()
});

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    for (label, stored) in RECORDS.iter() {
        group.bench_with_input(BenchmarkId::new("correct", label), stored, |b, s| {
            b.iter(|| assert!(verify(black_box(PASSWORD), s)))
        });
        group.bench_with_input(BenchmarkId::new("wrong", label), stored, |b, s| {
            b.iter(|| assert!(!verify(black_box("wrong_password"), s)))
        });
    }
    group.finish();
}

fn bench_malformed(c: &mut Criterion) {
    c.bench_function("verify_malformed", |b| {
        b.iter(|| verify(black_box(PASSWORD), black_box("PBKDF2$sha256$901$!!$??")))
    });
}

criterion_group!(benches, bench_verify, bench_malformed);
criterion_main!(benches);
