//! # curvepack
//!
//! Encode a sampled value curve into the fixed-point binary layout used by
//! a storage-constrained on-chain evaluator.
//!
//! Given an ordered set of `(x, y)` sample points, the codec:
//!
//! 1. **Fits** a monotone piecewise-cubic interpolant through the points
//!    (Fritsch–Carlson Hermite spline): the curve passes through every
//!    sample and never overshoots between monotone neighbours.
//! 2. **Normalizes** every cubic coefficient and base value into a
//!    `(sign, exponent, mantissa)` triple with scale-invariant precision.
//! 3. **Packs** the sign and exponent fields into 256-bit unsigned words
//!    for compact persistence.
//!
//! The on-chain consumer decodes the packed structure with the mirror-image
//! algorithm, so every bit of the output is contractual.
//!
//! ## Quick Start
//!
//! ```rust
//! use curvepack::CurveCodec;
//!
//! let codec = CurveCodec::new();
//! let curve = codec
//!     .encode_strs(&["0", "1", "2", "3"], &["0", "1", "2", "3"])
//!     .unwrap();
//!
//! assert_eq!(curve.breakpoints, ["0", "1", "2", "3"]);
//! assert_eq!(curve.signs.len(), 16);
//! assert_eq!(curve.packed_exponents.len(), 1);
//! ```
//!
//! ## Determinism
//!
//! There is no floating point anywhere in the pipeline. All arithmetic is
//! exact decimal ([`Decimal`]) except division, which carries a fixed
//! number of fractional digits ([`PRECISION`], 128) and a fixed rounding
//! mode (half-up); both are part of the codec's output contract. Every
//! call is an independent, side-effect-free batch transform: the same
//! points produce the same bytes on any platform, any number of times.
//!
//! ## Capacity tiers
//!
//! Piece tables are padded to the smallest tier that fits the input:
//!
//! | Points | Tier | Piece slots | Exponent words |
//! |--------|------|-------------|----------------|
//! | 2–4    | B4   | 4           | 1              |
//! | 5–16   | B16  | 16          | 2              |
//! | 17–64  | B64  | 64          | 8              |
//!
//! Sign flags always fit a single 256-bit word.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitpack;
mod codec;
pub mod decimal;
mod error;
pub mod normalize;
pub mod spline;

pub use codec::{CurveCodec, EncodedCurve, PieceBucket};
pub use decimal::{Decimal, RoundingMode, PRECISION};
pub use error::CurveError;
pub use normalize::{calculate_shifts, normalize, NormalizedValue, START_EXPONENT};
pub use spline::MonotoneSpline;

/// Convenience type alias for Results with CurveError.
pub type Result<T> = std::result::Result<T, CurveError>;
