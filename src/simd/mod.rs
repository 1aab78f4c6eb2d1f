//! Lane-width backends for the approximate reciprocal square root.
//!
//! Three widths implement the same algorithm: one lane ([`scalar`]), four
//! lanes (SSE2 on x86, NEON on aarch64) and eight lanes (AVX2 on x86, a pair
//! of NEON registers on aarch64). `build.rs` inspects the target and sets the
//! `avx2`, `sse`, `neon` or `fallback` cfgs; whatever is missing is served by
//! the lane-wise [`portable`] loops.
//!
//! The public entry points are:
//!
//! - [`approx_rsqrt`]: one `f32` in, one `f32` out.
//! - [`approx_rsqrt_single`]: one `f32` loaded into lane 0 of a 4-lane register.
//! - [`approx_rsqrt_narrow`]: a 16-byte aligned [`Lanes4`].
//! - [`approx_rsqrt_wide`]: a 32-byte aligned [`Lanes8`].
//!
//! For every input, lane `k` of any width is bit-identical to
//! `approx_rsqrt(input[k])`.

use std::ops::Index;

pub mod portable;
pub mod scalar;

#[cfg(sse)]
pub mod sse;

#[cfg(avx2)]
pub mod avx2;

#[cfg(neon)]
pub mod neon;

pub use scalar::approx_rsqrt;

/// Checks whether a pointer meets a vector type's preferred alignment.
pub trait Alignment<T> {
    fn is_aligned(ptr: *const T) -> bool;
}

/// Loading data from memory into a SIMD vector.
pub trait SimdLoad<T> {
    type Output;

    /// Loads a full vector, choosing aligned or unaligned access.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading `size` elements, and `size` must equal
    /// the lane count.
    unsafe fn load(ptr: *const T, size: usize) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must be aligned to the vector width and valid for a full vector read.
    unsafe fn load_aligned(ptr: *const T) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must be valid for a full vector read.
    unsafe fn load_unaligned(ptr: *const T) -> Self::Output;

    /// Loads fewer elements than the lane count; the remaining lanes are zero.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading `size` elements.
    unsafe fn load_partial(ptr: *const T, size: usize) -> Self::Output;
}

/// Storing a SIMD vector back to memory.
pub trait SimdStore<T> {
    /// Stores the valid lanes, choosing aligned, unaligned or partial access.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writing `size` elements of the vector.
    unsafe fn store_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must be aligned to the vector width and valid for a full vector write.
    unsafe fn store_aligned_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must be valid for a full vector write.
    unsafe fn store_unaligned_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must be valid for writing `size` elements of the vector.
    unsafe fn store_at_partial(&self, ptr: *mut T);
}

/// The reciprocal square root approximation on a SIMD vector.
pub trait RsqrtMath {
    type Output;

    /// Zeroth-order bit-hack estimate, before the Newton step.
    fn rsqrt_seed(&self) -> Self::Output;

    /// Bit-hack estimate refined by one Newton-Raphson step.
    fn rsqrt(&self) -> Self::Output;
}

/// Four lanes in 16-byte aligned storage, the memory shape of one SSE/NEON register.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C, align(16))]
pub struct Lanes4(pub [f32; 4]);

impl Lanes4 {
    pub const LANES: usize = 4;

    /// Every lane set to `value`.
    #[inline(always)]
    pub const fn splat(value: f32) -> Self {
        Self([value; 4])
    }

    #[inline(always)]
    pub const fn to_array(self) -> [f32; 4] {
        self.0
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const f32 {
        self.0.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.0.as_mut_ptr()
    }
}

impl From<[f32; 4]> for Lanes4 {
    fn from(lanes: [f32; 4]) -> Self {
        Self(lanes)
    }
}

impl From<Lanes4> for [f32; 4] {
    fn from(lanes: Lanes4) -> Self {
        lanes.0
    }
}

impl Index<usize> for Lanes4 {
    type Output = f32;

    fn index(&self, lane: usize) -> &f32 {
        &self.0[lane]
    }
}

/// Eight lanes in 32-byte aligned storage, the memory shape of one AVX2 register.
///
/// The alignment is part of the type, so the aligned-load precondition of the
/// 8-lane kernel cannot be violated from safe code.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C, align(32))]
pub struct Lanes8(pub [f32; 8]);

impl Lanes8 {
    pub const LANES: usize = 8;

    /// Every lane set to `value`.
    #[inline(always)]
    pub const fn splat(value: f32) -> Self {
        Self([value; 8])
    }

    #[inline(always)]
    pub const fn to_array(self) -> [f32; 8] {
        self.0
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const f32 {
        self.0.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.0.as_mut_ptr()
    }

    /// Splits into the low (lanes 0-3) and high (lanes 4-7) halves.
    #[inline(always)]
    pub fn halves(&self) -> (Lanes4, Lanes4) {
        let [a, b, c, d, e, f, g, h] = self.0;
        (Lanes4([a, b, c, d]), Lanes4([e, f, g, h]))
    }

    /// Joins two halves; `low` becomes lanes 0-3.
    #[inline(always)]
    pub fn from_halves(low: Lanes4, high: Lanes4) -> Self {
        let [a, b, c, d] = low.0;
        let [e, f, g, h] = high.0;
        Self([a, b, c, d, e, f, g, h])
    }
}

impl From<[f32; 8]> for Lanes8 {
    fn from(lanes: [f32; 8]) -> Self {
        Self(lanes)
    }
}

impl From<Lanes8> for [f32; 8] {
    fn from(lanes: Lanes8) -> Self {
        lanes.0
    }
}

impl Index<usize> for Lanes8 {
    type Output = f32;

    fn index(&self, lane: usize) -> &f32 {
        &self.0[lane]
    }
}

/// Which backend serves each lane width in this build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Backends {
    pub single: &'static str,
    pub narrow: &'static str,
    pub wide: &'static str,
}

/// Reports the backends selected at build time.
pub fn backends() -> Backends {
    let (single, narrow) = if cfg!(sse) {
        ("sse2 lane 0", "sse2")
    } else if cfg!(neon) {
        ("neon lane 0", "neon")
    } else {
        ("scalar", "portable")
    };

    let wide = if cfg!(avx2) {
        "avx2"
    } else if cfg!(sse) {
        "sse2 x2"
    } else if cfg!(neon) {
        "neon x2"
    } else {
        "portable"
    };

    Backends {
        single,
        narrow,
        wide,
    }
}

// ================================================================================================
// SINGLE LANE THROUGH A NARROW REGISTER
// ================================================================================================

/// Approximates `1/sqrt(*x)` by loading `x` into lane 0 of a 4-lane register.
///
/// This is the "single data SIMD" form: the arithmetic runs in vector
/// registers but only lane 0 is meaningful. Bit-identical to
/// [`approx_rsqrt`].
#[cfg(sse)]
#[inline(always)]
pub fn approx_rsqrt_single(x: &f32) -> f32 {
    // SAFETY: `x` is a valid reference to one f32.
    unsafe { sse::f32x4::F32x4::load_scalar(x) }.rsqrt_first()
}

/// Approximates `1/sqrt(*x)` by loading `x` into lane 0 of a 4-lane register.
#[cfg(neon)]
#[inline(always)]
pub fn approx_rsqrt_single(x: &f32) -> f32 {
    // SAFETY: `x` is a valid reference to one f32.
    unsafe { neon::f32x4::F32x4::load_scalar(x) }.rsqrt_first()
}

/// Approximates `1/sqrt(*x)`; without a vector backend this is the scalar path.
#[cfg(not(any(sse, neon)))]
#[inline(always)]
pub fn approx_rsqrt_single(x: &f32) -> f32 {
    approx_rsqrt(*x)
}

// ================================================================================================
// NARROW (4 LANES)
// ================================================================================================

/// Approximates `1/sqrt` on 4 independent lanes.
///
/// # Example
///
/// ```rust
/// use qrsqrt::{approx_rsqrt, approx_rsqrt_narrow, Lanes4};
///
/// let x = Lanes4([1.0, 4.0, 16.0, 64.0]);
/// let y = approx_rsqrt_narrow(&x);
/// for lane in 0..4 {
///     assert_eq!(y[lane].to_bits(), approx_rsqrt(x[lane]).to_bits());
/// }
/// ```
#[cfg(sse)]
#[inline(always)]
pub fn approx_rsqrt_narrow(x: &Lanes4) -> Lanes4 {
    use sse::f32x4::F32x4;

    let mut out = Lanes4::default();
    // SAFETY: `Lanes4` is 16-byte aligned and holds exactly 4 lanes.
    unsafe {
        F32x4::load_aligned(x.as_ptr())
            .rsqrt()
            .store_aligned_at(out.as_mut_ptr());
    }
    out
}

/// Approximates `1/sqrt` on 4 independent lanes.
#[cfg(neon)]
#[inline(always)]
pub fn approx_rsqrt_narrow(x: &Lanes4) -> Lanes4 {
    use neon::f32x4::F32x4;

    let mut out = Lanes4::default();
    // SAFETY: `Lanes4` holds exactly 4 lanes.
    unsafe {
        F32x4::load_aligned(x.as_ptr())
            .rsqrt()
            .store_aligned_at(out.as_mut_ptr());
    }
    out
}

/// Approximates `1/sqrt` on 4 independent lanes.
#[cfg(not(any(sse, neon)))]
#[inline(always)]
pub fn approx_rsqrt_narrow(x: &Lanes4) -> Lanes4 {
    Lanes4(portable::rsqrt_lanes(&x.0))
}

// ================================================================================================
// WIDE (8 LANES)
// ================================================================================================

/// Approximates `1/sqrt` on 8 independent lanes.
///
/// # Example
///
/// ```rust
/// use qrsqrt::{approx_rsqrt_wide, Lanes8};
///
/// let y = approx_rsqrt_wide(&Lanes8::splat(4.0));
/// assert!(y.0.iter().all(|&v| (v - 0.5).abs() < 0.5 * 0.002));
/// ```
#[cfg(avx2)]
#[inline(always)]
pub fn approx_rsqrt_wide(x: &Lanes8) -> Lanes8 {
    use avx2::f32x8::F32x8;

    let mut out = Lanes8::default();
    // SAFETY: `Lanes8` is 32-byte aligned and holds exactly 8 lanes; the
    // `avx2` cfg is only set when the target supports AVX2.
    unsafe {
        F32x8::load_aligned(x.as_ptr())
            .rsqrt()
            .store_aligned_at(out.as_mut_ptr());
    }
    out
}

/// Approximates `1/sqrt` on 8 independent lanes as two 4-lane registers.
#[cfg(all(not(avx2), any(sse, neon)))]
#[inline(always)]
pub fn approx_rsqrt_wide(x: &Lanes8) -> Lanes8 {
    let (low, high) = x.halves();
    Lanes8::from_halves(approx_rsqrt_narrow(&low), approx_rsqrt_narrow(&high))
}

/// Approximates `1/sqrt` on 8 independent lanes.
#[cfg(not(any(avx2, sse, neon)))]
#[inline(always)]
pub fn approx_rsqrt_wide(x: &Lanes8) -> Lanes8 {
    Lanes8(portable::rsqrt_lanes(&x.0))
}

// ================================================================================================
// BLOCK KERNELS FOR THE SLICE LAYER
// ================================================================================================

/// 8 lanes from `input` into `output`; both must hold exactly 8 elements.
#[cfg(avx2)]
#[inline(always)]
pub(crate) fn wide_block(input: &[f32], output: &mut [f32]) {
    assert_eq!(input.len(), Lanes8::LANES);
    assert_eq!(output.len(), Lanes8::LANES);

    // SAFETY: both slices hold exactly 8 elements; the `avx2` cfg is only set
    // when the target supports AVX2.
    unsafe { avx2::slice::rsqrt_block(input.as_ptr(), output.as_mut_ptr()) };
}

/// Fewer than 8 lanes from `input` into `output` using masked loads and stores.
#[cfg(avx2)]
#[inline(always)]
pub(crate) fn wide_partial_block(input: &[f32], output: &mut [f32]) {
    assert!(!input.is_empty() && input.len() < Lanes8::LANES);
    assert_eq!(input.len(), output.len());

    // SAFETY: both slices hold the same 1-7 elements the masks cover; the
    // `avx2` cfg is only set when the target supports AVX2.
    unsafe {
        avx2::slice::rsqrt_partial_block(input.as_ptr(), output.as_mut_ptr(), input.len())
    };
}

/// 8 lanes from `input` into `output`; both must hold exactly 8 elements.
#[cfg(all(not(avx2), neon))]
#[inline(always)]
pub(crate) fn wide_block(input: &[f32], output: &mut [f32]) {
    assert_eq!(input.len(), Lanes8::LANES);
    assert_eq!(output.len(), Lanes8::LANES);

    // SAFETY: both slices hold exactly 8 elements.
    unsafe { neon::slice::rsqrt_wide_block(input.as_ptr(), output.as_mut_ptr()) };
}

/// 8 lanes from `input` into `output`; both must hold exactly 8 elements.
#[cfg(all(not(avx2), not(neon)))]
#[inline(always)]
pub(crate) fn wide_block(input: &[f32], output: &mut [f32]) {
    debug_assert_eq!(input.len(), Lanes8::LANES);
    debug_assert_eq!(output.len(), Lanes8::LANES);

    let mut lanes = Lanes8::default();
    lanes.0.copy_from_slice(input);
    output.copy_from_slice(&approx_rsqrt_wide(&lanes).0);
}

/// Fewer than 8 lanes from `input` into `output`, zero-padding the register.
#[cfg(not(avx2))]
#[inline(always)]
pub(crate) fn wide_partial_block(input: &[f32], output: &mut [f32]) {
    debug_assert!(input.len() < Lanes8::LANES);
    debug_assert_eq!(input.len(), output.len());

    let mut lanes = Lanes8::default();
    lanes.0[..input.len()].copy_from_slice(input);
    output.copy_from_slice(&approx_rsqrt_wide(&lanes).0[..input.len()]);
}

/// 4 lanes from `input` into `output`; both must hold exactly 4 elements.
#[cfg(sse)]
#[inline(always)]
pub(crate) fn narrow_block(input: &[f32], output: &mut [f32]) {
    assert_eq!(input.len(), Lanes4::LANES);
    assert_eq!(output.len(), Lanes4::LANES);

    // SAFETY: both slices hold exactly 4 elements.
    unsafe { sse::slice::rsqrt_block(input.as_ptr(), output.as_mut_ptr()) };
}

/// 4 lanes from `input` into `output`; both must hold exactly 4 elements.
#[cfg(neon)]
#[inline(always)]
pub(crate) fn narrow_block(input: &[f32], output: &mut [f32]) {
    assert_eq!(input.len(), Lanes4::LANES);
    assert_eq!(output.len(), Lanes4::LANES);

    // SAFETY: both slices hold exactly 4 elements.
    unsafe { neon::slice::rsqrt_block(input.as_ptr(), output.as_mut_ptr()) };
}

/// 4 lanes from `input` into `output`; both must hold exactly 4 elements.
#[cfg(not(any(sse, neon)))]
#[inline(always)]
pub(crate) fn narrow_block(input: &[f32], output: &mut [f32]) {
    debug_assert_eq!(input.len(), Lanes4::LANES);
    debug_assert_eq!(output.len(), Lanes4::LANES);

    let mut lanes = Lanes4::default();
    lanes.0.copy_from_slice(input);
    output.copy_from_slice(&approx_rsqrt_narrow(&lanes).0);
}

/// Fewer than 4 lanes from `input` into `output`, zero-padding the register.
#[cfg(sse)]
#[inline(always)]
pub(crate) fn narrow_partial_block(input: &[f32], output: &mut [f32]) {
    assert!(input.len() < Lanes4::LANES);
    assert_eq!(input.len(), output.len());

    // SAFETY: both slices hold the same fewer-than-4 elements.
    unsafe { sse::slice::rsqrt_partial_block(input.as_ptr(), output.as_mut_ptr(), input.len()) };
}

/// Fewer than 4 lanes from `input` into `output`, zero-padding the register.
#[cfg(not(sse))]
#[inline(always)]
pub(crate) fn narrow_partial_block(input: &[f32], output: &mut [f32]) {
    debug_assert!(input.len() < Lanes4::LANES);
    debug_assert_eq!(input.len(), output.len());

    let mut lanes = Lanes4::default();
    lanes.0[..input.len()].copy_from_slice(input);
    output.copy_from_slice(&approx_rsqrt_narrow(&lanes).0[..input.len()]);
}
