//! AVX2 kernels for 8-lane reciprocal square root.
//!
//! This module is only compiled when `build.rs` sets the `avx2` cfg, which
//! happens when the target CPU (or `-C target-feature`) reports AVX2.
//!
//! # Available Types
//!
//! - [`f32x8`]: 256-bit vector containing 8 packed single-precision values
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(target_feature = "avx2")]
//! # {
//! use qrsqrt::simd::avx2::f32x8::F32x8;
//! use qrsqrt::simd::RsqrtMath;
//!
//! let data = [1.0f32, 4.0, 16.0, 64.0, 0.25, 9.0, 100.0, 2.0];
//! let y = F32x8::from(data.as_slice()).rsqrt().to_array();
//! assert!((y[1] - 0.5).abs() < 0.001);
//! # }
//! ```

pub mod f32x8;

pub mod math;

pub mod slice;
