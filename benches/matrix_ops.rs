use criterion::{criterion_group, criterion_main, Criterion};
use f2gauss::{F2Matrix, Region, RowColumnSearch};
use rand::{rngs::SmallRng, SeedableRng};
use std::hint::black_box;

fn matrix_mul(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    let a = F2Matrix::random(&mut rng, 256, 256);
    let b = F2Matrix::random(&mut rng, 256, 256);
    c.bench_function("mul_256", |bench| bench.iter(|| black_box(&a) * black_box(&b)));
}

fn full_gauss(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(2);
    let a = F2Matrix::random_invertible(&mut rng, 256);
    c.bench_function("gauss_256", |bench| {
        bench.iter(|| {
            let mut m = a.clone();
            m.gaussian_elimination();
            black_box(m)
        })
    });
}

fn rescue_gauss(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(3);
    let a = F2Matrix::random(&mut rng, 256, 320);
    let region = Region::new(0, 0, 255, 191);
    c.bench_function("partial_gauss_rescue_256", |bench| {
        bench.iter(|| {
            let mut m = a.clone();
            let _ = m.partial_gaussian_with_rescue(region, &mut RowColumnSearch);
            black_box(m)
        })
    });
}

criterion_group!(benches, matrix_mul, full_gauss, rescue_gauss);
criterion_main!(benches);
