//! Cutoff search performance benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_filter::{DigitalSearchSolver, Numeric, ResponseEvaluator, SearchConfig, SelectionStrategy};
use lib_types::{Band, FilterKind, FilterSpec, Hertz};

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("fir_search");
    group.sample_size(10);

    let spec = FilterSpec::new(Hertz(100.0), 20, FilterKind::Lowpass, 0.05, Band::Stop);
    let fs = Hertz(1000.0);

    for candidates in [250, 1000, 4000].iter() {
        for (label, strategy, parallel) in [
            ("closest", SelectionStrategy::ClosestMatch, false),
            ("closest_par", SelectionStrategy::ClosestMatch, true),
            ("threshold", SelectionStrategy::ThresholdCrossing, false),
        ] {
            let solver = DigitalSearchSolver::new(SearchConfig {
                candidates: *candidates,
                strategy,
                parallel,
                ..SearchConfig::default()
            });
            group.bench_with_input(BenchmarkId::new(label, candidates), &solver, |b, s| {
                b.iter(|| s.solve(black_box(&spec), fs));
            });
        }
    }

    group.finish();
}

fn bench_freqz(c: &mut Criterion) {
    let mut group = c.benchmark_group("freqz");
    let backend = Numeric::new();
    let taps: Vec<f64> = (0..63).map(|i| ((i as f64 - 31.0) * 0.2).cos() / 63.0).collect();

    // Different grid sizes
    for points in [512, 1024, 4096, 16384].iter() {
        group.bench_with_input(BenchmarkId::new("fir", points), points, |b, &n| {
            b.iter(|| backend.digital_response(black_box(&taps), &[1.0], n, Hertz(1000.0)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search, bench_freqz);
criterion_main!(benches);
