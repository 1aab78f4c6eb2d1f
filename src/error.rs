//! Error types for qrsqrt operations.
//!
//! The approximators themselves never fail: a non-positive or non-finite lane
//! simply yields an unspecified float. Errors only come from the layers built
//! around them (buffer validation, harness configuration, strict equivalence
//! sweeps).

use thiserror::Error;

use crate::equivalence::Mismatch;

/// Errors that can occur around the rsqrt kernels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RsqrtError {
    /// Invalid layout parameters were provided for an aligned buffer.
    #[error("Invalid memory layout: {message} (size: {size}, alignment: {alignment})")]
    LayoutError {
        /// The element count that caused the error.
        size: usize,
        /// The alignment that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },

    /// Input validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },

    /// The benchmark harness was configured with unusable values.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// A strict equivalence sweep found lane-width results that disagree.
    #[error("Numeric drift: {mismatches} mismatch(es) across lane widths, first: {first}")]
    DriftError {
        /// Total number of mismatches found in the sweep.
        mismatches: usize,
        /// The first mismatch encountered.
        first: Mismatch,
    },
}

/// Result type alias for qrsqrt operations.
pub type Result<T> = std::result::Result<T, RsqrtError>;

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> RsqrtError {
    RsqrtError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> RsqrtError {
    RsqrtError::ValidationError {
        message: message.into(),
    }
}

/// Creates a configuration error.
pub fn config_error(message: impl Into<String>) -> RsqrtError {
    RsqrtError::ConfigError {
        message: message.into(),
    }
}
