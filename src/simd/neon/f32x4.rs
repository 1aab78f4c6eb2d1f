//! NEON 4-lane f32 SIMD vector implementation.

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::simd::{neon::math::*, Alignment, RsqrtMath, SimdLoad, SimdStore};

/// Natural alignment of a `float32x4_t`.
pub(crate) const NEON_ALIGNMENT: usize = 16;

pub(crate) const LANE_COUNT: usize = 4;

/// A SIMD vector of 4 32-bit floating point values
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    /// Number of valid elements in the vector (1-4)
    pub size: usize,
    pub elements: float32x4_t,
}

impl Alignment<f32> for F32x4 {
    /// `vld1q_f32` accepts any f32-aligned address; this only reports whether
    /// the pointer sits on a 16-byte boundary.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % NEON_ALIGNMENT == 0
    }
}

impl From<&[f32]> for F32x4 {
    /// Full load for 4 or more elements, zero-padded partial load below that.
    fn from(slice: &[f32]) -> Self {
        debug_assert!(!slice.is_empty(), "Size can't be empty (size zero)");

        match slice.len().cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { Self::load_partial(slice.as_ptr(), slice.len()) },
            std::cmp::Ordering::Equal | std::cmp::Ordering::Greater => unsafe {
                Self::load(slice.as_ptr(), LANE_COUNT)
            },
        }
    }
}

impl F32x4 {
    /// Creates a new vector with all elements set to the same value.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { vdupq_n_f32(value) },
            size: LANE_COUNT,
        }
    }

    /// Loads one value into lane 0 and zeroes lanes 1-3.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading one f32.
    #[inline(always)]
    pub unsafe fn load_scalar(ptr: *const f32) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        Self {
            elements: vsetq_lane_f32(*ptr, vdupq_n_f32(0.0), 0),
            size: 1,
        }
    }

    /// Approximate `1/sqrt` of lane 0.
    #[inline(always)]
    pub fn rsqrt_first(&self) -> f32 {
        unsafe { vgetq_lane_f32(vrsqrt_approx_f32(self.elements), 0) }
    }

    /// Copies all 4 lanes out, including invalid ones.
    #[inline(always)]
    pub fn to_array(&self) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        unsafe { vst1q_f32(out.as_mut_ptr(), self.elements) };
        out
    }
}

impl SimdLoad<f32> for F32x4 {
    type Output = Self;

    #[inline(always)]
    unsafe fn load(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        debug_assert!(size == LANE_COUNT, "Size must be == {LANE_COUNT}");

        Self::load_unaligned(ptr)
    }

    /// NEON has a single load instruction for both cases.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self::load_unaligned(ptr)
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: vld1q_f32(ptr),
            size: LANE_COUNT,
        }
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let elements = match size {
            1 => {
                let v = vdupq_n_f32(0.0);
                vsetq_lane_f32(*ptr.add(0), v, 0)
            }
            2 => {
                let mut v = vdupq_n_f32(0.0);
                v = vsetq_lane_f32(*ptr.add(0), v, 0);
                vsetq_lane_f32(*ptr.add(1), v, 1)
            }
            3 => {
                let mut v = vdupq_n_f32(0.0);
                v = vsetq_lane_f32(*ptr.add(0), v, 0);
                v = vsetq_lane_f32(*ptr.add(1), v, 1);
                vsetq_lane_f32(*ptr.add(2), v, 2)
            }
            _ => unreachable!("Size must be < {}", LANE_COUNT),
        };

        Self { elements, size }
    }
}

impl SimdStore<f32> for F32x4 {
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(self.size <= LANE_COUNT, "Size must be <= {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match self.size.cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => self.store_at_partial(ptr),
            _ => self.store_unaligned_at(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        self.store_unaligned_at(ptr)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        vst1q_f32(ptr, self.elements);
    }

    #[inline(always)]
    unsafe fn store_at_partial(&self, ptr: *mut f32) {
        debug_assert!(self.size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match self.size {
            3 => {
                let low = vget_low_f32(self.elements); // [0, 1]
                vst1_f32(ptr, low);
                *ptr.add(2) = vgetq_lane_f32(self.elements, 2);
            }
            2 => {
                let low = vget_low_f32(self.elements);
                vst1_f32(ptr, low);
            }
            1 => {
                *ptr = vgetq_lane_f32(self.elements, 0);
            }
            _ => unreachable!("Size must be < {}", LANE_COUNT),
        }
    }
}

impl RsqrtMath for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn rsqrt_seed(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { vrsqrt_seed_f32(self.elements) },
        }
    }

    #[inline(always)]
    fn rsqrt(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { vrsqrt_approx_f32(self.elements) },
        }
    }
}
