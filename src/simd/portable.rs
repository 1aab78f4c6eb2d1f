//! Lane-wise fallback used when no SIMD backend was selected at build time.
//!
//! The loops are written as whole-array passes (seed every lane, then refine
//! every lane) so LLVM can auto-vectorize them; each lane still goes through
//! exactly the scalar operations, so results match [`approx_rsqrt`] bit for bit.
//!
//! [`approx_rsqrt`]: crate::simd::scalar::approx_rsqrt

use crate::simd::scalar::{newton_step, rsqrt_seed};

/// Zeroth-order estimate for each of `N` lanes.
#[inline(always)]
pub fn rsqrt_seed_lanes<const N: usize>(x: &[f32; N]) -> [f32; N] {
    let mut y = [0.0f32; N];
    for (out, &lane) in y.iter_mut().zip(x.iter()) {
        *out = rsqrt_seed(lane);
    }
    y
}

/// Bit-hack seed plus one Newton step on each of `N` independent lanes.
#[inline(always)]
pub fn rsqrt_lanes<const N: usize>(x: &[f32; N]) -> [f32; N] {
    let mut y = rsqrt_seed_lanes(x);
    for (out, &lane) in y.iter_mut().zip(x.iter()) {
        *out = newton_step(lane, *out);
    }
    y
}

/// Runs [`rsqrt_lanes`] on a block shorter than `N`, zero-padding the input.
///
/// Only the first `input.len()` lanes are written to `output`.
#[inline(always)]
pub fn rsqrt_partial_lanes<const N: usize>(input: &[f32], output: &mut [f32]) {
    debug_assert!(input.len() < N, "Size must be < {N}");
    debug_assert_eq!(input.len(), output.len());

    let mut lanes = [0.0f32; N];
    lanes[..input.len()].copy_from_slice(input);

    let result = rsqrt_lanes(&lanes);
    output.copy_from_slice(&result[..input.len()]);
}
