//! Error types for curve encoding operations.

use thiserror::Error;

/// Errors that can occur while encoding a curve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// The input point set is outside the supported size range, or the
    /// x and y slices disagree in length.
    #[error("curve requires 2..=64 points with equal x/y lengths, got {xs} x values and {ys} y values")]
    InvalidInputLength {
        /// Number of x values supplied.
        xs: usize,
        /// Number of y values supplied.
        ys: usize,
    },

    /// The breakpoint domain is not strictly increasing.
    #[error("breakpoints must be strictly increasing, violated at index {index}")]
    NonMonotonicDomain {
        /// Index of the first x value that is not greater than its predecessor.
        index: usize,
    },

    /// A normalized exponent does not fit the 8-bit storage field.
    #[error("normalized exponent {exponent} does not fit an 8-bit field")]
    ExponentOverflow {
        /// The shift counter that fell outside `0..=255`.
        exponent: i32,
    },

    /// A decimal literal could not be parsed.
    #[error("invalid decimal literal: {0}")]
    InvalidDecimal(String),

    /// Division by a zero decimal.
    #[error("decimal division by zero")]
    DivisionByZero,

    /// The bit width exceeds the maximum supported per packer call (32 bits).
    #[error("bit width {0} exceeds maximum of 32")]
    BitWidthExceeded(usize),

    /// A descriptor width that is neither 1 (boolean) nor 8 (uint8).
    #[error("descriptor width {0} is not a supported descriptor size")]
    UnsupportedDescriptorWidth(usize),

    /// Buffer overflow during bit unpacking.
    #[error("buffer overflow: attempted to read {attempted} bits, only {available} available")]
    BufferOverflow {
        /// The number of bits that were requested.
        attempted: usize,
        /// The number of bits remaining in the buffer.
        available: usize,
    },
}
