use criterion::{criterion_group, criterion_main, Criterion};
use fsc_tans::config::CoderConfig;
use fsc_tans::{decode, encode};

fn criterion_benchmark(c: &mut Criterion) {
    let text = b"the quick brown fox jumps over the lazy dog. ".repeat(400);
    let cfg = CoderConfig::new(12).unwrap();

    c.bench_function("encode text block", |b| {
        b.iter(|| encode(&text, &cfg).unwrap())
    });

    let encoded = encode(&text, &cfg).unwrap();
    c.bench_function("decode text block", |b| {
        b.iter(|| decode(&encoded).unwrap())
    });

    let random: Vec<u8> = (0..(1 << 16)).map(|_| rand::random::<u8>()).collect();
    let cfg14 = CoderConfig::new(14).unwrap();
    c.bench_function("encode random 64KiB", |b| {
        b.iter(|| encode(&random, &cfg14).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
