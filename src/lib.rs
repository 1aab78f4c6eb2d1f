//! # qrsqrt
//!
//! Fast approximate reciprocal square root: the `0x5F3759DF` bit-hack seed
//! followed by one Newton-Raphson step, for one, four or eight lanes at once.
//!
//! Every lane width produces exactly the same bits as the scalar
//! [`approx_rsqrt`] for the same input. The [`equivalence`] module checks that
//! across a sweep of inputs, and [`harness`] times the three benchmark methods
//! over large aligned buffers.
//!
//! ```rust
//! use qrsqrt::{approx_rsqrt, approx_rsqrt_wide, Lanes8};
//!
//! let y = approx_rsqrt(4.0);
//! assert!((y - 0.5).abs() < 0.5 * 0.002);
//!
//! let lanes = approx_rsqrt_wide(&Lanes8::splat(4.0));
//! assert!(lanes.0.iter().all(|v| v.to_bits() == y.to_bits()));
//! ```

pub mod equivalence;
pub mod error;
pub mod harness;
pub mod simd;
pub mod slice;
pub mod utils;

pub use error::{Result, RsqrtError};
pub use simd::{
    approx_rsqrt, approx_rsqrt_narrow, approx_rsqrt_single, approx_rsqrt_wide,
    scalar::RSQRT_MAGIC, Lanes4, Lanes8,
};
pub use slice::SimdRsqrt;

/// Below this many elements `fast_rsqrt` stays scalar.
pub const SIMD_THRESHOLD: usize = 64;

/// From this many elements on `fast_rsqrt` splits the work across threads.
pub const PARALLEL_SIMD_THRESHOLD: usize = 262_144;

/// Elements per rayon task; rounded down to a multiple of the lane count.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;
