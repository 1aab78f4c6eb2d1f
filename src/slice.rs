//! Reciprocal square root over whole slices.
//!
//! Every path here writes, for each element, exactly the bits
//! [`approx_rsqrt`] would produce; they differ only in how many lanes are
//! processed per step and whether the work is split across threads.
//!
//! | Path | Lanes per step | Threads |
//! |------|----------------|---------|
//! | `scalar_rsqrt` | 1 | 1 |
//! | `single_rsqrt` | 1 (through a vector register) | 1 |
//! | `narrow_rsqrt` | 4 | 1 |
//! | `simd_rsqrt` | 8 | 1 |
//! | `par_simd_rsqrt` | 8 | rayon pool |
//!
//! `fast_rsqrt` chooses between them by size using [`SIMD_THRESHOLD`] and
//! [`PARALLEL_SIMD_THRESHOLD`].

use rayon::prelude::*;

use crate::{
    error::{validation_error, Result},
    harness::Method,
    simd::{self, approx_rsqrt, approx_rsqrt_single, Lanes4, Lanes8},
    PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD, SIMD_THRESHOLD,
};

/// Slice-level reciprocal square root.
///
/// # Example
///
/// ```rust
/// use qrsqrt::{approx_rsqrt, SimdRsqrt};
///
/// let x: Vec<f32> = (1..=20).map(|i| i as f32).collect();
/// let y = x.as_slice().simd_rsqrt();
///
/// for (xi, yi) in x.iter().zip(y.iter()) {
///     assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits());
/// }
/// ```
pub trait SimdRsqrt {
    type Output;

    /// One element at a time with the scalar approximator.
    fn scalar_rsqrt(&self) -> Self::Output;

    /// One element at a time through lane 0 of a 4-lane register.
    fn single_rsqrt(&self) -> Self::Output;

    /// 4 elements per step.
    fn narrow_rsqrt(&self) -> Self::Output;

    /// 8 elements per step, remainder through a partial block.
    fn simd_rsqrt(&self) -> Self::Output;

    /// 8 elements per step on rayon worker threads.
    fn par_simd_rsqrt(&self) -> Self::Output;

    /// Picks scalar, SIMD or parallel SIMD by input size.
    fn fast_rsqrt(&self) -> Self::Output;
}

// ================================================================================================
// CALLER BUFFER OPERATIONS
// ================================================================================================
//
// Each `*_into` function panics when `a` and `c` differ in length.

/// Writes `approx_rsqrt(a[i])` into `c[i]`.
#[inline(always)]
pub fn scalar_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    for (x, y) in a.iter().zip(c.iter_mut()) {
        *y = approx_rsqrt(*x);
    }
}

/// Writes `approx_rsqrt_single(&a[i])` into `c[i]`.
#[inline(always)]
pub fn single_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    for (x, y) in a.iter().zip(c.iter_mut()) {
        *y = approx_rsqrt_single(x);
    }
}

/// 4-lane blocks, then one zero-padded partial block for the remainder.
#[inline(always)]
pub fn narrow_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    let size = a.len();
    let step = Lanes4::LANES;

    let complete_lanes = size - (size % step);
    let remaining_lanes = size - complete_lanes;

    for i in (0..complete_lanes).step_by(step) {
        simd::narrow_block(&a[i..i + step], &mut c[i..i + step]);
    }

    if remaining_lanes > 0 {
        simd::narrow_partial_block(&a[complete_lanes..], &mut c[complete_lanes..]);
    }
}

/// 8-lane blocks, then one partial block for the remainder.
#[inline(always)]
pub fn simd_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    let size = a.len();
    let step = Lanes8::LANES;

    let complete_lanes = size - (size % step);
    let remaining_lanes = size - complete_lanes;

    for i in (0..complete_lanes).step_by(step) {
        simd::wide_block(&a[i..i + step], &mut c[i..i + step]);
    }

    if remaining_lanes > 0 {
        simd::wide_partial_block(&a[complete_lanes..], &mut c[complete_lanes..]);
    }
}

/// Splits the output into chunks that are multiples of 8 lanes and runs
/// [`simd_rsqrt_into`] on each chunk in the rayon pool.
///
/// Each worker writes a disjoint chunk of `c`.
#[inline(always)]
pub fn parallel_simd_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    let step = Lanes8::LANES;

    let chunk_size = ((PARALLEL_CHUNK_SIZE / step) * step).max(step);

    c.par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(chunk_idx, c_chunk)| {
            let start_idx = chunk_idx * chunk_size;
            let end_idx = start_idx + c_chunk.len();

            simd_rsqrt_into(&a[start_idx..end_idx], c_chunk);
        });
}

/// Size-based choice between scalar, SIMD and parallel SIMD.
#[inline(always)]
pub fn fast_rsqrt_into(a: &[f32], c: &mut [f32]) {
    assert_eq!(a.len(), c.len(), "Input and output must have same length");

    match a.len() {
        0..SIMD_THRESHOLD => scalar_rsqrt_into(a, c),
        SIMD_THRESHOLD..PARALLEL_SIMD_THRESHOLD => simd_rsqrt_into(a, c),
        _ => parallel_simd_rsqrt_into(a, c),
    }
}

/// Runs one of the benchmark methods over `input`, writing into `output`.
///
/// # Errors
///
/// Returns a validation error if the two slices differ in length.
///
/// # Example
///
/// ```rust
/// use qrsqrt::harness::Method;
/// use qrsqrt::slice::rsqrt_into;
///
/// let input = [4.0f32; 10];
/// let mut output = [0.0f32; 10];
/// rsqrt_into(Method::MultipleDataSimd, &input, &mut output).unwrap();
/// assert!((output[9] - 0.5).abs() < 0.001);
///
/// let mut short = [0.0f32; 3];
/// assert!(rsqrt_into(Method::Original, &input, &mut short).is_err());
/// ```
pub fn rsqrt_into(method: Method, input: &[f32], output: &mut [f32]) -> Result<()> {
    if input.len() != output.len() {
        return Err(validation_error(format!(
            "input and output must have same length ({} != {})",
            input.len(),
            output.len()
        )));
    }

    match method {
        Method::Original => scalar_rsqrt_into(input, output),
        Method::SingleDataSimd => single_rsqrt_into(input, output),
        Method::MultipleDataSimd => simd_rsqrt_into(input, output),
    }

    Ok(())
}

// ================================================================================================
// ALLOCATING OPERATIONS
// ================================================================================================

#[inline(always)]
fn with_output(a: &[f32], kernel: fn(&[f32], &mut [f32])) -> Vec<f32> {
    let mut c = vec![0.0f32; a.len()];
    kernel(a, &mut c);
    c
}

impl SimdRsqrt for &[f32] {
    type Output = Vec<f32>;

    #[inline(always)]
    fn scalar_rsqrt(&self) -> Self::Output {
        with_output(self, scalar_rsqrt_into)
    }

    #[inline(always)]
    fn single_rsqrt(&self) -> Self::Output {
        with_output(self, single_rsqrt_into)
    }

    #[inline(always)]
    fn narrow_rsqrt(&self) -> Self::Output {
        with_output(self, narrow_rsqrt_into)
    }

    #[inline(always)]
    fn simd_rsqrt(&self) -> Self::Output {
        with_output(self, simd_rsqrt_into)
    }

    #[inline(always)]
    fn par_simd_rsqrt(&self) -> Self::Output {
        with_output(self, parallel_simd_rsqrt_into)
    }

    #[inline(always)]
    fn fast_rsqrt(&self) -> Self::Output {
        with_output(self, fast_rsqrt_into)
    }
}

impl SimdRsqrt for Vec<f32> {
    type Output = Vec<f32>;

    #[inline(always)]
    fn scalar_rsqrt(&self) -> Self::Output {
        self.as_slice().scalar_rsqrt()
    }

    #[inline(always)]
    fn single_rsqrt(&self) -> Self::Output {
        self.as_slice().single_rsqrt()
    }

    #[inline(always)]
    fn narrow_rsqrt(&self) -> Self::Output {
        self.as_slice().narrow_rsqrt()
    }

    #[inline(always)]
    fn simd_rsqrt(&self) -> Self::Output {
        self.as_slice().simd_rsqrt()
    }

    #[inline(always)]
    fn par_simd_rsqrt(&self) -> Self::Output {
        self.as_slice().par_simd_rsqrt()
    }

    #[inline(always)]
    fn fast_rsqrt(&self) -> Self::Output {
        self.as_slice().fast_rsqrt()
    }
}
