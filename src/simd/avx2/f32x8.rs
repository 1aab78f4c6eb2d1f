//! AVX2 8-lane f32 SIMD vector implementation.
//!
//! This module provides `F32x8`, a SIMD vector type that wraps Intel's AVX2 `__m256`
//! intrinsic to run the reciprocal square root approximation on 8 single-precision
//! values at once.
//!
//! # Supported Operations
//!
//! ## Loading and Storing
//! - `From<&[f32]>` trait - High-level loading with automatic partial handling
//! - `load_aligned()`, `load_unaligned()` - Direct memory loading
//! - `load_partial()` - Masked loading for sizes < 8
//! - `store_at()` - Automatic store with size detection
//! - `store_aligned_at()`, `store_unaligned_at()` - Direct memory storing
//!
//! ## Mathematical Functions
//! - `rsqrt_seed()`, `rsqrt()`

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::{avx2::math::*, Alignment, RsqrtMath, SimdLoad, SimdStore};

/// AVX2 memory alignment requirement in bytes.
///
/// `_mm256_load_ps` and `_mm256_store_ps` fault on addresses that are not
/// 32-byte aligned.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
///
/// It keeps both the underlying AVX2 register and the count of valid elements
/// for partial operations.
///
/// # Usage
///
/// ```rust
/// # #[cfg(target_feature = "avx2")]
/// # {
/// use qrsqrt::simd::avx2::f32x8::F32x8;
/// use qrsqrt::simd::RsqrtMath;
///
/// let data = [4.0f32; 8];
/// let y = F32x8::from(data.as_slice()).rsqrt().to_array();
/// assert!(y.iter().all(|v| (v - 0.5).abs() < 0.001));
/// # }
/// ```
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// Number of valid elements in the vector (1-8)
    pub size: usize,
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl Alignment<f32> for F32x8 {
    /// `true` if the pointer is 32-byte aligned.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % AVX_ALIGNMENT == 0
    }
}

impl From<&[f32]> for F32x8 {
    /// Creates an F32x8 vector from a slice of f32 values.
    ///
    /// - For slices with 8 or more elements: full SIMD load of the first 8
    /// - For slices with fewer than 8 elements: masked load with zero-padding
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

impl F32x8 {
    /// Broadcasts `value` to all 8 lanes.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            size: LANE_COUNT,
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    /// Copies all 8 lanes out, including invalid ones.
    #[inline(always)]
    pub fn to_array(&self) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.elements) };
        out
    }
}

/// Lane mask with the first `size` lanes enabled.
#[inline(always)]
unsafe fn partial_mask(size: usize) -> __m256i {
    match size {
        1 => _mm256_setr_epi32(-1, 0, 0, 0, 0, 0, 0, 0),
        2 => _mm256_setr_epi32(-1, -1, 0, 0, 0, 0, 0, 0),
        3 => _mm256_setr_epi32(-1, -1, -1, 0, 0, 0, 0, 0),
        4 => _mm256_setr_epi32(-1, -1, -1, -1, 0, 0, 0, 0),
        5 => _mm256_setr_epi32(-1, -1, -1, -1, -1, 0, 0, 0),
        6 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, 0, 0),
        7 => _mm256_setr_epi32(-1, -1, -1, -1, -1, -1, -1, 0),
        _ => unreachable!("Size must be < LANE_COUNT"),
    }
}

impl SimdLoad<f32> for F32x8 {
    type Output = Self;

    /// Loads exactly 8 elements, aligned or unaligned depending on `ptr`.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size == LANE_COUNT, "Size must be == {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F32x8::is_aligned(ptr) {
            true => unsafe { Self::load_aligned(ptr) },
            false => unsafe { Self::load_unaligned(ptr) },
        }
    }

    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_load_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// # Safety
    ///
    /// Pointer must point to at least 8 valid f32 values.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_loadu_ps(ptr),
            size: LANE_COUNT,
        }
    }

    /// Loads 1-7 elements with `_mm256_maskload_ps`; masked lanes read as zero
    /// and the memory behind them is never touched.
    ///
    /// # Safety
    ///
    /// Pointer must not be null and must point to at least `size` valid f32 values.
    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self::Output {
        debug_assert!(size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        Self {
            elements: _mm256_maskload_ps(ptr, partial_mask(size)),
            size,
        }
    }
}

impl SimdStore<f32> for F32x8 {
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
            std::cmp::Ordering::Equal => match F32x8::is_aligned(ptr) {
                true => unsafe { self.store_aligned_at(ptr) },
                false => unsafe { self.store_unaligned_at(ptr) },
            },
            std::cmp::Ordering::Greater => unreachable!("Size cannot exceed LANE_COUNT"),
        }
    }

    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and point to at least 8 writable f32 values.
    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        _mm256_store_ps(ptr, self.elements)
    }

    /// # Safety
    ///
    /// Pointer must point to at least 8 writable f32 values.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }

    /// Writes only the first `self.size` lanes with `_mm256_maskstore_ps`.
    ///
    /// # Safety
    ///
    /// Pointer must point to at least `self.size` writable f32 values.
    #[inline(always)]
    unsafe fn store_at_partial(&self, ptr: *mut f32) {
        debug_assert!(self.size < LANE_COUNT, "Size must be < {LANE_COUNT}");
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        _mm256_maskstore_ps(ptr, partial_mask(self.size), self.elements);
    }
}

impl RsqrtMath for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn rsqrt_seed(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { _mm256_rsqrt_seed_ps(self.elements) },
        }
    }

    #[inline(always)]
    fn rsqrt(&self) -> Self::Output {
        Self {
            size: self.size,
            elements: unsafe { _mm256_rsqrt_approx_ps(self.elements) },
        }
    }
}
