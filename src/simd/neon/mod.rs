//! ARM NEON kernels for 4-lane reciprocal square root.
//!
//! NEON has no 256-bit registers; the 8-lane path runs two `float32x4_t`
//! registers back to back (see [`slice::rsqrt_wide_block`]).
//!
//! This module is only compiled when the `neon` CPU feature is available. The build
//! system detects this on AArch64 hosts and from `CARGO_CFG_TARGET_FEATURE`.

pub mod math;

pub mod f32x4;

pub mod slice;
