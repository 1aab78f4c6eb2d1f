//! SSE2 block kernels used by the slice layer's 4-lane path.

use crate::simd::{
    sse::f32x4::{self, F32x4},
    RsqrtMath, SimdLoad, SimdStore,
};

/// Processes a complete 4-element block.
///
/// # Arguments
///
/// * `a` - Pointer to 4 input values
/// * `c` - Pointer to 4 writable output values
///
/// # Safety
///
/// `a` must be valid for reading 4 `f32` values and `c` valid for writing 4.
/// Either pointer may be unaligned; alignment is detected and the matching
/// load/store is used.
#[inline(always)]
pub(crate) unsafe fn rsqrt_block(a: *const f32, c: *mut f32) {
    // SAFETY: forwarded from the caller.
    unsafe {
        let a_chunk_simd = F32x4::load(a, f32x4::LANE_COUNT);
        a_chunk_simd.rsqrt().store_at(c);
    }
}

/// Processes 1-3 trailing elements through a zero-padded register.
///
/// # Safety
///
/// `size` must be in `1..4`, `a` valid for reading `size` values and `c`
/// valid for writing `size` values.
#[inline(always)]
pub(crate) unsafe fn rsqrt_partial_block(a: *const f32, c: *mut f32, size: usize) {
    // SAFETY: forwarded from the caller; only `size` lanes are stored.
    unsafe {
        let a_chunk_simd = F32x4::load_partial(a, size);
        a_chunk_simd.rsqrt().store_at_partial(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::approx_rsqrt;

    #[test]
    fn test_block_on_unaligned_slice() {
        let input = [0.0f32, 1.0, 4.0, 9.0, 16.0];
        let mut output = [0.0f32; 5];
        unsafe { rsqrt_block(input[1..].as_ptr(), output[1..].as_mut_ptr()) };
        for i in 1..5 {
            assert_eq!(output[i].to_bits(), approx_rsqrt(input[i]).to_bits());
        }
        assert_eq!(output[0], 0.0);
    }

    #[test]
    fn test_partial_block() {
        let input = [25.0f32, 36.0, 49.0];
        for size in 1..4 {
            let mut output = [-1.0f32; 4];
            unsafe { rsqrt_partial_block(input.as_ptr(), output.as_mut_ptr(), size) };
            for i in 0..size {
                assert_eq!(output[i].to_bits(), approx_rsqrt(input[i]).to_bits());
            }
            assert!(output[size..].iter().all(|&v| v == -1.0));
        }
    }
}
