//! AVX2 kernels for the approximate reciprocal square root.
//!
//! | Function | Operation |
//! |----------|-----------|
//! | `_mm256_rsqrt_seed_ps` | `magic - (bits >> 1)` reinterpreted as f32 |
//! | `_mm256_rsqrt_newton_ps` | `y * (1.5 - (0.5 * x) * (y * y))` |
//! | `_mm256_rsqrt_approx_ps` | seed followed by one Newton step |
//!
//! The integer shift and subtract need AVX2; AVX alone only has the float
//! half. No FMA is used, so each lane rounds exactly like the scalar path.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::scalar::{HALF, RSQRT_MAGIC, THREE_HALFS};

/// Bit-hack estimate on 8 lanes.
///
/// # Safety
///
/// The caller must ensure that the target CPU supports AVX2 instructions.
#[inline]
#[target_feature(enable = "avx,avx2")]
pub unsafe fn _mm256_rsqrt_seed_ps(x: __m256) -> __m256 {
    let bits = _mm256_castps_si256(x);
    // arithmetic shift, same as `i32 >> 1`
    let halved = _mm256_srai_epi32(bits, 1);
    _mm256_castsi256_ps(_mm256_sub_epi32(_mm256_set1_epi32(RSQRT_MAGIC), halved))
}

/// One Newton-Raphson step on 8 lanes.
///
/// # Safety
///
/// The caller must ensure that the target CPU supports AVX instructions.
#[inline]
#[target_feature(enable = "avx")]
pub unsafe fn _mm256_rsqrt_newton_ps(x: __m256, y: __m256) -> __m256 {
    let half_x = _mm256_mul_ps(x, _mm256_set1_ps(HALF));
    let y_squared = _mm256_mul_ps(y, y);
    _mm256_mul_ps(
        y,
        _mm256_sub_ps(_mm256_set1_ps(THREE_HALFS), _mm256_mul_ps(half_x, y_squared)),
    )
}

/// Approximate `1/sqrt(x)` on 8 lanes.
///
/// # Safety
///
/// The caller must ensure that the target CPU supports AVX2 instructions.
#[inline]
#[target_feature(enable = "avx,avx2")]
pub unsafe fn _mm256_rsqrt_approx_ps(x: __m256) -> __m256 {
    _mm256_rsqrt_newton_ps(x, _mm256_rsqrt_seed_ps(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{approx_rsqrt, rsqrt_seed};

    fn to_array(v: __m256) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), v) };
        out
    }

    #[test]
    fn test_seed_matches_scalar() {
        let x = [1.0f32, 3.0, 0.0, 1.0e6, 0.5, 2.0, 1.0e-3, 42.0];
        let y = to_array(unsafe { _mm256_rsqrt_seed_ps(_mm256_loadu_ps(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), rsqrt_seed(*xi).to_bits());
        }
    }

    #[test]
    fn test_approx_matches_scalar() {
        let x: Vec<f32> = (0..64).map(|i| i as f32 * 13.25).collect();
        for chunk in x.chunks_exact(8) {
            let y = to_array(unsafe { _mm256_rsqrt_approx_ps(_mm256_loadu_ps(chunk.as_ptr())) });
            for (xi, yi) in chunk.iter().zip(y.iter()) {
                assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits(), "input {xi}");
            }
        }
    }

    #[test]
    fn test_off_domain_lanes_match_scalar() {
        let x = [
            -1.0f32,
            -0.0,
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::MIN_POSITIVE,
            f32::MAX,
            -4.0,
        ];
        let y = to_array(unsafe { _mm256_rsqrt_approx_ps(_mm256_loadu_ps(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            let expected = approx_rsqrt(*xi);
            assert!(
                yi.to_bits() == expected.to_bits() || (yi.is_nan() && expected.is_nan()),
                "input {xi}: {yi} vs {expected}"
            );
        }
    }
}
