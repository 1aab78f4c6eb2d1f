//! Reciprocal square root benchmarks across lane widths.
//!
//! Compares the scalar bit-hack, the single-lane register path, the 4-lane and
//! 8-lane paths and the parallel 8-lane path against `1.0 / x.sqrt()` over an
//! `ndarray` array, at sizes chosen to sit in successive cache levels.

use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qrsqrt::harness::{Harness, HarnessConfig, Method};
use qrsqrt::SimdRsqrt;

// ================================================================================================
// BENCHMARK CONFIGURATION
// ================================================================================================

const VECTOR_SIZES: &[usize] = &[
    1_024,     // 4 KiB - L1 cache
    16_384,    // 64 KiB - L1→L2 transition
    262_144,   // 1 MiB - L2 cache, parallel SIMD threshold
    1_048_576, // 4 MiB - L3 cache
    4_194_304, // 16 MiB - L3→RAM transition
];

/// Buffer size for the harness-method group.
const HARNESS_SIZE: usize = 1_048_576;

/// Reproducible positive inputs in `[1e-3, 1e6)`.
fn generate_test_data(len: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(42);

    (0..len).map(|_| rng.random_range(1.0e-3f32..1.0e6)).collect()
}

// ================================================================================================
// BENCHMARK IMPLEMENTATIONS
// ================================================================================================

fn benchmark_rsqrt_implementations(c: &mut Criterion) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("Rsqrt {}", format_size(size)));

        group.throughput(Throughput::Bytes(
            (size * std::mem::size_of::<f32>()) as u64,
        ));

        let input_vec = generate_test_data(size);
        let input_slice = input_vec.as_slice();

        group.bench_with_input(BenchmarkId::new("Scalar", size), input_slice, |b, input| {
            b.iter(|| black_box(input.scalar_rsqrt()))
        });

        group.bench_with_input(
            BenchmarkId::new("Single lane SIMD", size),
            input_slice,
            |b, input| b.iter(|| black_box(input.single_rsqrt())),
        );

        group.bench_with_input(BenchmarkId::new("4 lanes", size), input_slice, |b, input| {
            b.iter(|| black_box(input.narrow_rsqrt()))
        });

        group.bench_with_input(BenchmarkId::new("8 lanes", size), input_slice, |b, input| {
            b.iter(|| black_box(input.simd_rsqrt()))
        });

        group.bench_with_input(
            BenchmarkId::new("Parallel SIMD", size),
            input_slice,
            |b, input| b.iter(|| black_box(black_box(input).par_simd_rsqrt())),
        );

        group.bench_with_input(BenchmarkId::new("Fast", size), input_slice, |b, input| {
            b.iter(|| black_box(input.fast_rsqrt()))
        });

        let input_ndarray = Array1::from_vec(input_vec.clone());
        group.bench_with_input(
            BenchmarkId::new("ndarray 1/sqrt", size),
            &input_ndarray,
            |b, input| b.iter(|| black_box(input.mapv(|x| 1.0 / x.sqrt()))),
        );

        group.finish();
    }
}

/// The three methods of the timing harness on one aligned buffer pair.
fn benchmark_harness_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("Harness methods {}", format_size(HARNESS_SIZE)));
    group.throughput(Throughput::Bytes(
        (HARNESS_SIZE * std::mem::size_of::<f32>()) as u64,
    ));

    let config = HarnessConfig {
        iterations: 1,
        array_size: HARNESS_SIZE,
    };
    let mut harness = Harness::new(config).expect("harness allocation");
    harness.warm_cache(12345.0).expect("warm-up");

    for method in Method::ALL {
        group.bench_function(BenchmarkId::new(method.name(), HARNESS_SIZE), |b| {
            b.iter(|| black_box(harness.time_method(method, black_box(12345.0)).unwrap()))
        });
    }

    group.finish();
}

// ================================================================================================
// UTILITY FUNCTIONS
// ================================================================================================

/// Formats vector sizes into human-readable strings.
fn format_size(elements: usize) -> String {
    let bytes = elements * std::mem::size_of::<f32>();

    if bytes >= 1_073_741_824 {
        format!("{:.1} GiB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

fn all_benchmarks(c: &mut Criterion) {
    let backends = qrsqrt::simd::backends();
    println!(
        "Starting rsqrt benchmarks (single: {}, narrow: {}, wide: {})",
        backends.single, backends.narrow, backends.wide
    );

    let start_time = Instant::now();

    benchmark_rsqrt_implementations(c);
    benchmark_harness_methods(c);

    println!(
        "Benchmark suite completed in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
}

// ================================================================================================
// CRITERION INTEGRATION
// ================================================================================================

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
