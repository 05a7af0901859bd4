use criterion::{black_box, criterion_group, Criterion};
use dpmech::{laplace_mechanism, Epsilon, GeneratorOpenSSL, SeededGenerator, Sensitivity};

fn laplace_benchmark(c: &mut Criterion) {
    let sensitivity = Sensitivity::bounded_mean(20.0, 60.0, 1000).unwrap();
    let epsilon = Epsilon::new(1.0).unwrap();

    let mut rng = SeededGenerator::from_seed(0);
    c.bench_function("laplace seeded", |b| {
        b.iter(|| laplace_mechanism(black_box(40.0), sensitivity, epsilon, &mut rng).unwrap())
    });
    let mut rng = GeneratorOpenSSL {};
    c.bench_function("laplace openssl", |b| {
        b.iter(|| laplace_mechanism(black_box(40.0), sensitivity, epsilon, &mut rng).unwrap())
    });
}

criterion_group!(benches, laplace_benchmark);
