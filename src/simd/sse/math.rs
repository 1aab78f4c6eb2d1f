//! SSE2 kernels for the approximate reciprocal square root.
//!
//! | Function | Lanes | Operation |
//! |----------|-------|-----------|
//! | `_mm_rsqrt_seed_ps` | 4 | `magic - (bits >> 1)` reinterpreted as f32 |
//! | `_mm_rsqrt_newton_ps` | 4 | `y * (1.5 - (0.5 * x) * (y * y))` |
//! | `_mm_rsqrt_approx_ps` | 4 | seed followed by one Newton step |
//! | `_mm_rsqrt_approx_ss` | 1 (lane 0) | same, with `_ss` arithmetic |
//!
//! Multiplication and subtraction are issued separately, never as FMA, so the
//! rounding matches the scalar path exactly.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::scalar::{HALF, RSQRT_MAGIC, THREE_HALFS};

/// Bit-hack estimate on 4 lanes.
///
/// `_mm_castps_si128` reinterprets without conversion; `_mm_srai_epi32` is
/// the arithmetic shift matching `i32 >> 1`.
///
/// # Safety
///
/// Requires SSE2.
#[inline(always)]
pub unsafe fn _mm_rsqrt_seed_ps(x: __m128) -> __m128 {
    let bits = _mm_castps_si128(x);
    let halved = _mm_srai_epi32(bits, 1);
    _mm_castsi128_ps(_mm_sub_epi32(_mm_set1_epi32(RSQRT_MAGIC), halved))
}

/// One Newton-Raphson step on 4 lanes.
///
/// # Safety
///
/// Requires SSE2.
#[inline(always)]
pub unsafe fn _mm_rsqrt_newton_ps(x: __m128, y: __m128) -> __m128 {
    let half_x = _mm_mul_ps(x, _mm_set1_ps(HALF));
    let y_squared = _mm_mul_ps(y, y);
    _mm_mul_ps(
        y,
        _mm_sub_ps(_mm_set1_ps(THREE_HALFS), _mm_mul_ps(half_x, y_squared)),
    )
}

/// Approximate `1/sqrt(x)` on 4 lanes.
///
/// # Safety
///
/// Requires SSE2.
#[inline(always)]
pub unsafe fn _mm_rsqrt_approx_ps(x: __m128) -> __m128 {
    _mm_rsqrt_newton_ps(x, _mm_rsqrt_seed_ps(x))
}

/// Approximate `1/sqrt(x)` on lane 0 only.
///
/// The integer seed has no scalar form and runs on all lanes; the floating
/// point refinement uses `_ss` instructions, so lanes 1-3 of the result are
/// whatever the seed produced for them. Only lane 0 is meaningful.
///
/// # Safety
///
/// Requires SSE2.
#[inline(always)]
pub unsafe fn _mm_rsqrt_approx_ss(x: __m128) -> __m128 {
    let y = _mm_rsqrt_seed_ps(x);
    let half_x = _mm_mul_ss(x, _mm_set1_ps(HALF));
    let y_squared = _mm_mul_ss(y, y);
    _mm_mul_ss(
        y,
        _mm_sub_ss(_mm_set1_ps(THREE_HALFS), _mm_mul_ss(half_x, y_squared)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{approx_rsqrt, rsqrt_seed};

    fn to_array(v: __m128) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        unsafe { _mm_storeu_ps(out.as_mut_ptr(), v) };
        out
    }

    #[test]
    fn test_seed_matches_scalar() {
        let x = [1.0f32, 3.0, 0.0, 1.0e6];
        let y = to_array(unsafe { _mm_rsqrt_seed_ps(_mm_loadu_ps(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), rsqrt_seed(*xi).to_bits());
        }
    }

    #[test]
    fn test_approx_ps_matches_scalar() {
        let x = [0.5f32, 2.0, 4.0, 12345.0];
        let y = to_array(unsafe { _mm_rsqrt_approx_ps(_mm_loadu_ps(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits());
        }
    }

    #[test]
    fn test_approx_ss_lane_zero() {
        for x in [1.0f32, 4.0, 7.5, 9999.0, 0.0] {
            let y = unsafe { _mm_cvtss_f32(_mm_rsqrt_approx_ss(_mm_load_ss(&x))) };
            assert_eq!(y.to_bits(), approx_rsqrt(x).to_bits());
        }
    }

    #[test]
    fn test_negative_lanes_match_scalar() {
        // arithmetic shift keeps every width in agreement even off-domain
        let x = [-1.0f32, -4.0, f32::MIN, -0.0];
        let y = to_array(unsafe { _mm_rsqrt_approx_ps(_mm_loadu_ps(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits());
        }
    }
}
