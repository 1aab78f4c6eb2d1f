//! NEON block kernels for the slice layer.

use crate::simd::{
    neon::f32x4::{self, F32x4},
    RsqrtMath, SimdLoad, SimdStore,
};

/// Processes a complete 4-element block.
///
/// # Safety
///
/// `a` must be valid for reading 4 `f32` values and `c` valid for writing 4.
#[inline(always)]
pub(crate) unsafe fn rsqrt_block(a: *const f32, c: *mut f32) {
    // SAFETY: forwarded from the caller.
    unsafe {
        let a_chunk_simd = F32x4::load(a, f32x4::LANE_COUNT);
        a_chunk_simd.rsqrt().store_at(c);
    }
}

/// Processes a complete 8-element block as two registers.
///
/// # Safety
///
/// `a` must be valid for reading 8 `f32` values and `c` valid for writing 8.
#[inline(always)]
pub(crate) unsafe fn rsqrt_wide_block(a: *const f32, c: *mut f32) {
    // SAFETY: forwarded from the caller; the high half starts 4 lanes in.
    unsafe {
        let low = F32x4::load(a, f32x4::LANE_COUNT);
        let high = F32x4::load(a.add(f32x4::LANE_COUNT), f32x4::LANE_COUNT);

        low.rsqrt().store_at(c);
        high.rsqrt().store_at(c.add(f32x4::LANE_COUNT));
    }
}
