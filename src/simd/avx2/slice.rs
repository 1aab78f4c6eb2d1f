//! AVX2 block kernels used by the slice layer's 8-lane path.

use crate::simd::{
    avx2::f32x8::{self, F32x8},
    RsqrtMath, SimdLoad, SimdStore,
};

/// Processes a complete 8-element block.
///
/// # Arguments
///
/// * `a` - Pointer to 8 input values
/// * `c` - Pointer to 8 writable output values
///
/// # Safety
///
/// `a` must be valid for reading 8 `f32` values and `c` valid for writing 8,
/// and the CPU must support AVX2. Either pointer may be unaligned; alignment
/// is detected and the matching load/store is used.
#[inline]
#[target_feature(enable = "avx,avx2")]
pub(crate) unsafe fn rsqrt_block(a: *const f32, c: *mut f32) {
    // SAFETY: forwarded from the caller.
    unsafe {
        let a_chunk_simd = F32x8::load(a, f32x8::LANE_COUNT);
        a_chunk_simd.rsqrt().store_at(c);
    }
}

/// Processes 1-7 trailing elements with masked loads and stores.
///
/// # Safety
///
/// `size` must be in `1..8`, `a` valid for reading `size` values and `c`
/// valid for writing `size` values, and the CPU must support AVX2. Lanes at
/// or past `size` are neither read nor written.
#[inline]
#[target_feature(enable = "avx,avx2")]
pub(crate) unsafe fn rsqrt_partial_block(a: *const f32, c: *mut f32, size: usize) {
    // SAFETY: forwarded from the caller; the store mask covers `size` lanes.
    unsafe {
        let a_chunk_simd = F32x8::load_partial(a, size);
        a_chunk_simd.rsqrt().store_at(c);
    }
}
