use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use dpmech::{exponential_mechanism, Candidate, Epsilon, SeededGenerator};

/// Selection cost as the candidate set grows.
fn outcomespace_size_benchmark(c: &mut Criterion) {
    let epsilon = Epsilon::new(1.0).unwrap();
    let mut group = c.benchmark_group("outcomespace_size");
    for size in [10u32, 100, 1000, 10_000].iter() {
        let candidates: Vec<Candidate<u32>> = (0..*size).map(|i| Candidate::new(i, (i + 1) as f64)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            let mut rng = SeededGenerator::from_seed(1);
            b.iter(|| exponential_mechanism(black_box(candidates), epsilon, &mut rng).unwrap().index)
        });
    }
    group.finish();
}

criterion_group!(benches, outcomespace_size_benchmark);
