//! Slice-level paths compared against the scalar approximator.

use qrsqrt::harness::Method;
use qrsqrt::slice::{rsqrt_into, SimdRsqrt};
use qrsqrt::{approx_rsqrt, PARALLEL_SIMD_THRESHOLD, SIMD_THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::statistics::{Data, Distribution, Max};

fn random_inputs(seed: u64, size: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.random_range(1.0e-3f32..1.0e6)).collect()
}

fn assert_matches_scalar(input: &[f32], output: &[f32], label: &str) {
    assert_eq!(input.len(), output.len(), "{label}: length");
    for (i, (x, y)) in input.iter().zip(output.iter()).enumerate() {
        assert_eq!(
            y.to_bits(),
            approx_rsqrt(*x).to_bits(),
            "{label}: index {i}, input {x}"
        );
    }
}

#[test]
fn test_every_path_on_random_inputs() {
    let data = random_inputs(12345, 10_007);

    assert_matches_scalar(&data, &data.scalar_rsqrt(), "scalar");
    assert_matches_scalar(&data, &data.single_rsqrt(), "single");
    assert_matches_scalar(&data, &data.narrow_rsqrt(), "narrow");
    assert_matches_scalar(&data, &data.simd_rsqrt(), "simd");
    assert_matches_scalar(&data, &data.par_simd_rsqrt(), "par_simd");
    assert_matches_scalar(&data, &data.fast_rsqrt(), "fast");
}

#[test]
fn test_fast_rsqrt_across_thresholds() {
    for size in [
        1,
        SIMD_THRESHOLD - 1,
        SIMD_THRESHOLD,
        SIMD_THRESHOLD + 3,
        PARALLEL_SIMD_THRESHOLD - 1,
        PARALLEL_SIMD_THRESHOLD + 9,
    ] {
        let data = random_inputs(size as u64, size);
        assert_matches_scalar(&data, &data.as_slice().fast_rsqrt(), "fast");
    }
}

#[test]
fn test_unaligned_subslices() {
    let data = random_inputs(7, 200);
    for offset in 0..8 {
        let slice = &data[offset..offset + 131];
        assert_matches_scalar(slice, &slice.simd_rsqrt(), "simd");
        assert_matches_scalar(slice, &slice.narrow_rsqrt(), "narrow");
    }
}

#[test]
fn test_rsqrt_into_every_method() {
    let data = random_inputs(99, 4_099);
    let mut output = vec![0.0f32; data.len()];

    for method in Method::ALL {
        output.fill(0.0);
        rsqrt_into(method, &data, &mut output).unwrap();
        assert_matches_scalar(&data, &output, method.name());
    }
}

#[test]
fn test_relative_error_summary() {
    let data = random_inputs(2024, 50_000);
    let approx = data.simd_rsqrt();

    let errors: Vec<f64> = data
        .iter()
        .zip(approx.iter())
        .map(|(&x, &y)| {
            let exact = 1.0 / (x as f64).sqrt();
            ((y as f64) - exact).abs() / exact
        })
        .collect();

    let stats = Data::new(errors);
    let mean = stats.mean().unwrap();
    let max = stats.max();

    println!("relative error: mean {mean:.3e}, max {max:.3e}");
    assert!(max < 0.002, "max relative error {max:.3e}");
    assert!(mean < 0.0015, "mean relative error {mean:.3e}");
}
