//! SSE2 SIMD implementations for 128-bit vector operations.
//!
//! SSE2 is part of the x86_64 baseline, so on 64-bit x86 this backend is
//! always compiled; on 32-bit x86 the build script enables it when the CPU
//! (or `-C target-feature`) provides SSE2.
//!
//! # Available Types
//!
//! - [`f32x4::F32x4`]: 128-bit vector containing 4 packed single-precision values
//!
//! # Memory Alignment
//!
//! `_mm_load_ps` / `_mm_store_ps` require 16-byte alignment, which
//! [`Lanes4`](crate::simd::Lanes4) provides by construction.

pub mod f32x4;

pub mod math;

pub mod slice;
