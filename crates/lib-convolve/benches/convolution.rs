//! Masked convolution performance benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_convolve::{
    naive_convolve, separable_kernel, ConvolveConfig, Execution, MaskedConvolver, WindowType,
};
use ndarray::Array2;

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("masked_convolution");

    let kernel = separable_kernel(WindowType::Gaussian { sigma: 1.5 }, &[7, 7]).unwrap();
    let sequential = MaskedConvolver::new(
        kernel.clone(),
        ConvolveConfig::default().with_execution(Execution::Sequential),
    );
    let parallel = MaskedConvolver::new(
        kernel.clone(),
        ConvolveConfig::default().with_execution(Execution::Parallel),
    );

    // Square frames of increasing size
    for side in [64usize, 256, 512].iter() {
        let image = Array2::from_shape_fn((*side, *side), |(i, j)| {
            100.0 + (i as f64 * 0.05).sin() * (j as f64 * 0.03).cos()
        });
        // Every 17th pixel flagged as a cosmic-ray hit
        let mask = Array2::from_shape_fn((*side, *side), |(i, j)| (i * side + j) % 17 == 0);

        group.bench_with_input(BenchmarkId::new("naive", side), &image, |b, img| {
            b.iter(|| naive_convolve(black_box(&img.view()), &kernel));
        });

        group.bench_with_input(
            BenchmarkId::new("sequential", side),
            &(&image, &mask),
            |b, (img, m)| {
                b.iter(|| sequential.convolve(black_box(&img.view()), Some(&m.view())));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", side),
            &(&image, &mask),
            |b, (img, m)| {
                b.iter(|| parallel.convolve(black_box(&img.view()), Some(&m.view())));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_convolution);
criterion_main!(benches);
