use criterion::{criterion_group, criterion_main, Criterion};
use fsc_tans::spreads::{bit_reverse_spread, build_spread_table_bucket, fse_spread};

fn criterion_benchmark(c: &mut Criterion) {
    let mut hist = [0usize; 256];
    hist['A' as usize] = 5;
    hist['B' as usize] = 5;
    hist['C' as usize] = 3;
    hist['D' as usize] = 3;
    let table_log = 4;

    c.bench_function("bucket spread", |b| {
        b.iter(|| build_spread_table_bucket(&hist, table_log))
    });
    c.bench_function("bit-reverse spread", |b| {
        b.iter(|| bit_reverse_spread(&hist, table_log))
    });
    c.bench_function("modulo-step spread", |b| {
        b.iter(|| fse_spread(&hist, table_log, None))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
