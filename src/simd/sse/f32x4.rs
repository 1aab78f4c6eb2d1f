//! SSE2 4-lane f32 SIMD vector implementation.
//!
//! `F32x4` wraps an `__m128` register together with the number of valid
//! lanes, mirroring the 8-lane AVX2 type.
//!
//! # Supported Operations
//!
//! ## Loading and Storing
//! - `From<&[f32]>` - loading with automatic partial handling
//! - `load_aligned()`, `load_unaligned()` - direct memory loading
//! - `load_partial()` - zero-padded loading for sizes < 4
//! - `load_scalar()` - one value into lane 0 (`_mm_load_ss`)
//! - `store_at()` and friends - the mirror image of the loads
//!
//! ## Mathematical Functions
//! - `rsqrt_seed()`, `rsqrt()` on all lanes, `rsqrt_first()` on lane 0

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::{sse::math::*, Alignment, RsqrtMath, SimdLoad, SimdStore};

/// SSE memory alignment requirement in bytes.
pub(crate) const SSE_ALIGNMENT: usize = 16;

/// Number of f32 elements that fit in an SSE 128-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// SSE2 SIMD vector containing 4 packed f32 values.
///
/// ```rust
/// # #[cfg(target_arch = "x86_64")]
/// # {
/// use qrsqrt::simd::sse::f32x4::F32x4;
/// use qrsqrt::simd::RsqrtMath;
///
/// let data = [1.0f32, 4.0, 16.0, 64.0];
/// let y = F32x4::from(data.as_slice()).rsqrt().to_array();
/// assert!((y[1] - 0.5).abs() < 0.001);
/// # }
/// ```
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    /// Number of valid elements in the vector (1-4)
    pub size: usize,
    /// SSE 128-bit register containing 4 packed f32 values
    pub elements: __m128,
}

impl Alignment<f32> for F32x4 {
    /// `true` if `ptr` is 16-byte aligned.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % SSE_ALIGNMENT == 0
    }
}

impl From<&[f32]> for F32x4 {
    /// Full load for 4 or more elements, zero-padded partial load below that.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the slice is empty.
    fn from(slice: &[f32]) -> Self {
        debug_assert!(!slice.is_empty(), "data pointer can't be NULL");

        let size = slice.len();

        match size.cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { Self::load_partial(slice.as_ptr(), size) },
            std::cmp::Ordering::Equal | std::cmp::Ordering::Greater => unsafe {
                Self::load(slice.as_ptr(), LANE_COUNT)
            },
        }
    }
}

impl F32x4 {
    /// Broadcasts `value` to all 4 lanes.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            size: LANE_COUNT,
            elements: unsafe { _mm_set1_ps(value) },
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
            size: 1,
            elements: _mm_load_ss(ptr),
        }
    }

    /// Approximate `1/sqrt` of lane 0, computed with `_ss` arithmetic.
    #[inline(always)]
    pub fn rsqrt_first(&self) -> f32 {
        unsafe { _mm_cvtss_f32(_mm_rsqrt_approx_ss(self.elements)) }
    }

    /// Copies all 4 lanes out, including invalid ones.
    #[inline(always)]
    pub fn to_array(&self) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        unsafe { _mm_storeu_ps(out.as_mut_ptr(), self.elements) };
        out
    }
}

impl SimdLoad<f32> for F32x4 {
    type Output = Self;

    /// Loads exactly 4 elements, aligned or unaligned depending on `ptr`.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least 4 valid f32 values.
    #[inline(always)]
    unsafe fn load(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size == LANE_COUNT, "Size must be == {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F32x4::is_aligned(ptr) {
            true => unsafe { Self::load_aligned(ptr) },
            false => unsafe { Self::load_unaligned(ptr) },
        }
    }

    /// # Safety
    ///
    /// Pointer must be 16-byte aligned and point to at least 4 valid f32 values.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm_load_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// # Safety
    ///
    /// Pointer must point to at least 4 valid f32 values.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm_loadu_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads 1-3 elements; SSE2 has no masked load, so the values go through
    /// a zeroed stack buffer.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least `size` valid f32 values.
    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let mut padded = [0.0f32; LANE_COUNT];
        std::ptr::copy_nonoverlapping(ptr, padded.as_mut_ptr(), size);

        Self {
            elements: _mm_loadu_ps(padded.as_ptr()),
            size,
        }
    }
}

impl SimdStore<f32> for F32x4 {
    /// Stores the valid lanes, picking partial, aligned or unaligned stores.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to writable memory for `self.size` elements.
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(self.size <= LANE_COUNT, "Size must be <= {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match self.size.cmp(&LANE_COUNT) {
            std::cmp::Ordering::Less => unsafe { self.store_at_partial(ptr) },
            std::cmp::Ordering::Equal => match F32x4::is_aligned(ptr) {
                true => unsafe { self.store_aligned_at(ptr) },
                false => unsafe { self.store_unaligned_at(ptr) },
            },
            std::cmp::Ordering::Greater => unreachable!("Size cannot exceed LANE_COUNT"),
        }
    }

    /// # Safety
    ///
    /// Pointer must be 16-byte aligned and point to at least 4 writable f32 values.
    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        _mm_store_ps(ptr, self.elements)
    }

    /// # Safety
    ///
    /// Pointer must point to at least 4 writable f32 values.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm_storeu_ps(ptr, self.elements)
    }

    /// Writes only the first `self.size` lanes.
    ///
    /// # Safety
    ///
    /// Pointer must point to at least `self.size` writable f32 values.
    #[inline(always)]
    unsafe fn store_at_partial(&self, ptr: *mut f32) {
        debug_assert!(self.size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        let lanes = self.to_array();
        std::ptr::copy_nonoverlapping(lanes.as_ptr(), ptr, self.size);
    }
}

impl RsqrtMath for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn rsqrt_seed(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { _mm_rsqrt_seed_ps(self.elements) },
        }
    }

    #[inline(always)]
    fn rsqrt(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { _mm_rsqrt_approx_ps(self.elements) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::approx_rsqrt;
    use crate::simd::Lanes4;

    mod alignment_tests {
        use super::*;

        #[test]
        fn test_lanes4_is_aligned() {
            let lanes = Lanes4::splat(1.0);
            assert!(F32x4::is_aligned(lanes.as_ptr()));
        }

        #[test]
        fn test_is_not_aligned() {
            let lanes = [Lanes4::splat(1.0), Lanes4::splat(2.0)];
            let unaligned_ptr = unsafe { lanes[0].as_ptr().add(1) };
            assert!(!F32x4::is_aligned(unaligned_ptr));
        }
    }

    mod simd_load_tests {
        use super::*;

        #[test]
        fn test_from_slice_full() {
            let data = [1.0, 2.0, 3.0, 4.0];
            let vec = F32x4::from(data.as_slice());

            assert_eq!(vec.size, 4);
            assert_eq!(vec.to_array(), data);
        }

        #[test]
        fn test_from_slice_oversized() {
            let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
            let vec = F32x4::from(data.as_slice());

            assert_eq!(vec.size, 4);
            assert_eq!(vec.to_array(), [1.0, 2.0, 3.0, 4.0]);
        }

        #[test]
        fn test_load_partial_zero_pads() {
            for size in 1..LANE_COUNT {
                let data: Vec<f32> = (1..=size).map(|i| i as f32).collect();
                let vec = unsafe { F32x4::load_partial(data.as_ptr(), size) };

                assert_eq!(vec.size, size);
                let elements = vec.to_array();
                for (i, e) in elements.iter().enumerate() {
                    let expected = if i < size { (i + 1) as f32 } else { 0.0 };
                    assert_eq!(*e, expected, "Mismatch at index {i} for size {size}");
                }
            }
        }

        #[test]
        fn test_load_unaligned() {
            let data = [0.0, 1.0, 2.0, 3.0, 4.0];
            let vec = unsafe { F32x4::load_unaligned(data.as_ptr().add(1)) };
            assert_eq!(vec.to_array(), [1.0, 2.0, 3.0, 4.0]);
        }

        #[test]
        fn test_load_scalar() {
            let x = 42.0f32;
            let vec = unsafe { F32x4::load_scalar(&x) };
            assert_eq!(vec.size, 1);
            assert_eq!(vec.to_array(), [42.0, 0.0, 0.0, 0.0]);
        }
    }

    mod simd_store_tests {
        use super::*;

        #[test]
        fn test_store_aligned() {
            let vec = F32x4::splat(3.0);
            let mut out = Lanes4::default();
            unsafe { vec.store_aligned_at(out.as_mut_ptr()) };
            assert_eq!(out.0, [3.0; 4]);
        }

        #[test]
        fn test_store_partial_leaves_tail_untouched() {
            let data = [1.0f32, 2.0];
            let vec = F32x4::from(data.as_slice());
            let mut out = [9.0f32; 4];
            unsafe { vec.store_at(out.as_mut_ptr()) };
            assert_eq!(out, [1.0, 2.0, 9.0, 9.0]);
        }

        #[test]
        fn test_store_unaligned() {
            let vec = F32x4::from([5.0f32, 6.0, 7.0, 8.0].as_slice());
            let mut out = [0.0f32; 5];
            unsafe { vec.store_at(out.as_mut_ptr().add(1)) };
            assert_eq!(out, [0.0, 5.0, 6.0, 7.0, 8.0]);
        }
    }

    mod rsqrt_tests {
        use super::*;

        #[test]
        fn test_rsqrt_matches_scalar() {
            let data = [1.0f32, 2.0, 0.1, 5000.0];
            let y = F32x4::from(data.as_slice()).rsqrt().to_array();
            for (x, y) in data.iter().zip(y.iter()) {
                assert_eq!(y.to_bits(), approx_rsqrt(*x).to_bits());
            }
        }

        #[test]
        fn test_rsqrt_first_matches_scalar() {
            for i in 0..2000 {
                let x = i as f32 * 0.75;
                let y = unsafe { F32x4::load_scalar(&x) }.rsqrt_first();
                assert_eq!(y.to_bits(), approx_rsqrt(x).to_bits(), "input {x}");
            }
        }

        #[test]
        fn test_rsqrt_keeps_size() {
            let vec = F32x4::from([4.0f32, 9.0].as_slice());
            assert_eq!(vec.rsqrt().size, 2);
            assert_eq!(vec.rsqrt_seed().size, 2);
        }
    }
}
