use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use dpmech::{exponential_mechanism, Candidate, Epsilon, GeneratorOpenSSL, SeededGenerator};

fn perks() -> Vec<Candidate<&'static str>> {
    vec![
        Candidate::new("Free Lunch", 120.0),
        Candidate::new("Gym Membership", 80.0),
        Candidate::new("Extra Paid Leave", 60.0),
    ]
}

/// Compare the cost of a selection across privacy levels and random sources.
fn exponential_benchmark(c: &mut Criterion) {
    let candidates = perks();
    let mut group = c.benchmark_group("exponential");
    for e in [0.1, 1.0, 2.0].iter() {
        let epsilon = Epsilon::new(*e).unwrap();
        group.bench_with_input(BenchmarkId::new("seeded", e), &epsilon, |b, epsilon| {
            let mut rng = SeededGenerator::from_seed(0);
            b.iter(|| exponential_mechanism(black_box(&candidates), *epsilon, &mut rng).unwrap().index)
        });
        group.bench_with_input(BenchmarkId::new("openssl", e), &epsilon, |b, epsilon| {
            let mut rng = GeneratorOpenSSL {};
            b.iter(|| exponential_mechanism(black_box(&candidates), *epsilon, &mut rng).unwrap().index)
        });
    }
    group.finish();
}

criterion_group!(benches, exponential_benchmark);
