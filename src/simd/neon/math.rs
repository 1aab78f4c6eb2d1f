//! NEON kernels for the approximate reciprocal square root.
//!
//! `vrsqrteq_f32` is deliberately not used: its estimate differs from the
//! bit-hack seed, and every lane must agree with the scalar path bit for bit.
//! Multiply and subtract are separate instructions (no `vmlsq`/`vfmsq`) for
//! the same reason.

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::simd::scalar::{HALF, RSQRT_MAGIC, THREE_HALFS};

/// Bit-hack estimate on 4 lanes.
///
/// # Safety
///
/// Requires NEON.
#[inline(always)]
pub unsafe fn vrsqrt_seed_f32(x: float32x4_t) -> float32x4_t {
    let bits = vreinterpretq_s32_f32(x);
    // arithmetic shift, same as `i32 >> 1`
    let halved = vshrq_n_s32(bits, 1);
    vreinterpretq_f32_s32(vsubq_s32(vdupq_n_s32(RSQRT_MAGIC), halved))
}

/// One Newton-Raphson step on 4 lanes.
///
/// # Safety
///
/// Requires NEON.
#[inline(always)]
pub unsafe fn vrsqrt_newton_f32(x: float32x4_t, y: float32x4_t) -> float32x4_t {
    let half_x = vmulq_f32(x, vdupq_n_f32(HALF));
    let y_squared = vmulq_f32(y, y);
    vmulq_f32(
        y,
        vsubq_f32(vdupq_n_f32(THREE_HALFS), vmulq_f32(half_x, y_squared)),
    )
}

/// Approximate `1/sqrt(x)` on 4 lanes.
///
/// # Safety
///
/// Requires NEON.
#[inline(always)]
pub unsafe fn vrsqrt_approx_f32(x: float32x4_t) -> float32x4_t {
    vrsqrt_newton_f32(x, vrsqrt_seed_f32(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{approx_rsqrt, rsqrt_seed};

    fn to_array(v: float32x4_t) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        unsafe { vst1q_f32(out.as_mut_ptr(), v) };
        out
    }

    #[test]
    fn test_seed_matches_scalar() {
        let x = [1.0f32, 3.0, 0.0, 1.0e6];
        let y = to_array(unsafe { vrsqrt_seed_f32(vld1q_f32(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), rsqrt_seed(*xi).to_bits());
        }
    }

    #[test]
    fn test_approx_matches_scalar() {
        let x = [0.5f32, 2.0, 4.0, 12345.0];
        let y = to_array(unsafe { vrsqrt_approx_f32(vld1q_f32(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits());
        }
    }

    #[test]
    fn test_negative_lanes_match_scalar() {
        let x = [-1.0f32, -4.0, f32::MIN, -0.0];
        let y = to_array(unsafe { vrsqrt_approx_f32(vld1q_f32(x.as_ptr())) });
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_eq!(yi.to_bits(), approx_rsqrt(*xi).to_bits());
        }
    }
}
