//! Fixed-point normalization of decimal values.
//!
//! Every coefficient and base value is stored on-chain as a
//! `(sign, exponent, mantissa)` triple with `value ≈ sign * mantissa *
//! 10^-exponent`. The exponent is chosen by [`calculate_shifts`] so that the
//! pre-scaling magnitude lands in the band `(0.1, 1]`, which gives every
//! mantissa the same number of significant digits no matter how large or
//! small the input is. Curve coefficients routinely span dozens of orders
//! of magnitude, so per-value scaling is what keeps relative precision flat
//! across the curve.

use num_bigint::{BigInt, BigUint};

use crate::decimal::Decimal;
use crate::error::CurveError;

/// Shift counter start value; yields 24-digit mantissas for in-band inputs.
pub const START_EXPONENT: i32 = 24;

/// A decimal value reduced to sign, 8-bit exponent and integer mantissa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedValue {
    /// True for non-negative values (zero is positive).
    pub sign: bool,
    /// Power-of-ten scale: `value ≈ mantissa * 10^-exponent`.
    pub exponent: u8,
    /// Integer magnitude.
    pub mantissa: BigUint,
}

impl NormalizedValue {
    /// The all-zero triple used for padding slots.
    pub fn padding() -> Self {
        NormalizedValue {
            sign: false,
            exponent: 0,
            mantissa: BigUint::default(),
        }
    }

    /// Reconstruct the decimal value `±mantissa * 10^-exponent`.
    pub fn to_decimal(&self) -> Decimal {
        let mantissa = BigInt::from(self.mantissa.clone());
        let mantissa = if self.sign { mantissa } else { -mantissa };
        Decimal::new(mantissa, self.exponent as i64)
    }
}

/// Count the power-of-ten shifts that bring `|value|` into the band
/// `(0.1, 1]`, starting the counter at `start`.
///
/// Zero is the degenerate case and always returns 0. Each shift is an exact
/// decimal scale adjustment, so the result depends only on the value.
pub fn calculate_shifts(value: &Decimal, start: i32) -> i32 {
    if value.is_zero() {
        return 0;
    }
    let one = Decimal::one();
    let tenth = Decimal::one().mul_pow10(-1);
    let mut v = value.abs();
    let mut counter = start;
    while v > one {
        v = v.mul_pow10(-1);
        counter -= 1;
    }
    while v <= tenth {
        v = v.mul_pow10(1);
        counter += 1;
    }
    counter
}

/// Normalize a decimal into a [`NormalizedValue`].
///
/// Fails with [`CurveError::ExponentOverflow`] when the computed exponent
/// falls outside the 8-bit storage field. Overflow is rejected rather than
/// saturated: a clamped exponent would silently rescale the stored value.
pub fn normalize(value: &Decimal) -> Result<NormalizedValue, CurveError> {
    let shifts = calculate_shifts(value, START_EXPONENT);
    let exponent =
        u8::try_from(shifts).map_err(|_| CurveError::ExponentOverflow { exponent: shifts })?;
    let mantissa = value.abs().mul_pow10(exponent as i64).floor_magnitude();
    Ok(NormalizedValue {
        sign: !value.is_negative(),
        exponent,
        mantissa,
    })
}
