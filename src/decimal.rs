//! Exact decimal arithmetic for the curve pipeline.
//!
//! Every value that flows through the codec is a [`Decimal`]: an
//! arbitrary-precision integer mantissa paired with a power-of-ten scale,
//! `value = mantissa * 10^-scale`. Addition, subtraction and multiplication
//! are exact; division is the only lossy operation and always takes an
//! explicit result scale and [`RoundingMode`], so two runs over the same
//! input produce identical bits on any platform.
//!
//! The codec performs all of its divisions at [`PRECISION`] fractional
//! digits with half-up rounding. That pair is part of the output contract:
//! changing either changes the persisted coefficients.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::error::CurveError;

/// Number of fractional digits carried by every division the codec performs.
pub const PRECISION: u32 = 128;

/// Rounding applied to the final digit of a division result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (the codec default).
    #[default]
    HalfUp,
    /// Round half to the nearest even quotient.
    HalfEven,
    /// Truncate toward zero.
    Down,
    /// Round away from zero.
    Up,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceil,
}

impl RoundingMode {
    /// Round `n / d` to an integer. `d` must be positive.
    fn round(self, n: &BigInt, d: &BigInt) -> BigInt {
        match self {
            RoundingMode::HalfUp => half_up(n, d),
            RoundingMode::HalfEven => half_even(n, d),
            RoundingMode::Down => n / d,
            RoundingMode::Up => away_div(n, d),
            RoundingMode::Floor => floor_div(n, d),
            RoundingMode::Ceil => ceil_div(n, d),
        }
    }
}

fn pow10(exp: u64) -> BigInt {
    BigInt::from(10u32).pow(exp as u32)
}

fn floor_div(n: &BigInt, d: &BigInt) -> BigInt {
    let (q, r) = n.div_rem(d);
    if !r.is_zero() && r.is_negative() {
        q - 1
    } else {
        q
    }
}

fn ceil_div(n: &BigInt, d: &BigInt) -> BigInt {
    let (q, r) = n.div_rem(d);
    if !r.is_zero() && r.is_positive() {
        q + 1
    } else {
        q
    }
}

fn away_div(n: &BigInt, d: &BigInt) -> BigInt {
    let (q, r) = n.div_rem(d);
    if r.is_zero() {
        q
    } else if n.is_negative() {
        q - 1
    } else {
        q + 1
    }
}

fn half_up(n: &BigInt, d: &BigInt) -> BigInt {
    let abs_n = n.abs();
    let (q, r) = abs_n.div_rem(d);
    let result = if &r * 2 >= *d { q + 1 } else { q };
    if n.is_negative() {
        -result
    } else {
        result
    }
}

fn half_even(n: &BigInt, d: &BigInt) -> BigInt {
    let abs_n = n.abs();
    let (q, r) = abs_n.div_rem(d);
    let two_r: BigInt = &r * 2;
    let result = match two_r.cmp(d) {
        Ordering::Greater => q + 1,
        Ordering::Equal => {
            if q.is_even() {
                q
            } else {
                q + 1
            }
        }
        Ordering::Less => q,
    };
    if n.is_negative() {
        -result
    } else {
        result
    }
}

/// An exact decimal number: `mantissa * 10^-scale`.
///
/// Values are kept in canonical form (no trailing zeros in the mantissa,
/// zero has scale 0), so structural equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    mantissa: BigInt,
    scale: i64,
}

impl Decimal {
    /// Build a decimal from a mantissa and scale, reducing to canonical form.
    pub fn new(mantissa: BigInt, scale: i64) -> Self {
        let mut mantissa = mantissa;
        let mut scale = scale;
        if mantissa.is_zero() {
            return Decimal { mantissa, scale: 0 };
        }
        let ten = BigInt::from(10u32);
        loop {
            let (q, r) = mantissa.div_rem(&ten);
            if !r.is_zero() {
                break;
            }
            mantissa = q;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    /// The decimal zero.
    pub fn zero() -> Self {
        Decimal {
            mantissa: BigInt::zero(),
            scale: 0,
        }
    }

    /// The decimal one.
    pub fn one() -> Self {
        Decimal::from(1)
    }

    /// True if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// True if the value is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// The sign of the value: `-1`, `0` or `1`.
    pub fn signum(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Decimal {
        Decimal {
            mantissa: self.mantissa.abs(),
            scale: self.scale,
        }
    }

    /// Multiply by `10^exp` exactly. Negative `exp` divides.
    pub fn mul_pow10(&self, exp: i64) -> Decimal {
        if self.is_zero() {
            return Decimal::zero();
        }
        Decimal {
            mantissa: self.mantissa.clone(),
            scale: self.scale - exp,
        }
    }

    /// Largest integer less than or equal to the value.
    pub fn floor(&self) -> BigInt {
        if self.scale <= 0 {
            &self.mantissa * pow10(self.scale.unsigned_abs())
        } else {
            floor_div(&self.mantissa, &pow10(self.scale as u64))
        }
    }

    /// Magnitude of the floor, as an unsigned integer.
    ///
    /// Callers pass non-negative values; for them this is exactly
    /// [`Decimal::floor`].
    pub fn floor_magnitude(&self) -> BigUint {
        self.floor().magnitude().clone()
    }

    /// Divide by `rhs`, keeping `scale` fractional digits in the quotient
    /// and rounding the final digit per `mode`.
    pub fn div(&self, rhs: &Decimal, scale: u32, mode: RoundingMode) -> Result<Decimal, CurveError> {
        if rhs.is_zero() {
            return Err(CurveError::DivisionByZero);
        }
        let shift = scale as i64 + rhs.scale - self.scale;
        let (mut num, mut den) = if shift >= 0 {
            (&self.mantissa * pow10(shift as u64), rhs.mantissa.clone())
        } else {
            (
                self.mantissa.clone(),
                &rhs.mantissa * pow10(shift.unsigned_abs()),
            )
        };
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Ok(Decimal::new(mode.round(&num, &den), scale as i64))
    }

    fn aligned_mantissa(&self, scale: i64) -> BigInt {
        debug_assert!(scale >= self.scale);
        &self.mantissa * pow10((scale - self.scale) as u64)
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal::new(BigInt::from(v), 0)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ls, rs) = (self.signum(), other.signum());
        if ls != rs {
            return ls.cmp(&rs);
        }
        let scale = self.scale.max(other.scale);
        self.aligned_mantissa(scale)
            .cmp(&other.aligned_mantissa(scale))
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(
            self.aligned_mantissa(scale) + rhs.aligned_mantissa(scale),
            scale,
        )
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(
            self.aligned_mantissa(scale) - rhs.aligned_mantissa(scale),
            scale,
        )
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &rhs.mantissa, self.scale + rhs.scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            mantissa: -&self.mantissa,
            scale: self.scale,
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        &self * &rhs
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        -&self
    }
}

impl FromStr for Decimal {
    type Err = CurveError;

    /// Parse a plain or scientific decimal literal: `-12.5`, `0.001`, `3e-4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CurveError::InvalidDecimal(s.to_string());
        let t = s.trim();
        let (t, negative) = match t.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (t.strip_prefix('+').unwrap_or(t), false),
        };
        let (body, exp) = match t.find(|c| c == 'e' || c == 'E') {
            Some(pos) => {
                let exp: i64 = t[pos + 1..].parse().map_err(|_| err())?;
                (&t[..pos], exp)
            }
            None => (t, 0),
        };
        let (int_part, frac_part) = match body.find('.') {
            Some(pos) => (&body[..pos], &body[pos + 1..]),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(err());
        }
        let mut mantissa: BigInt = format!("{int_part}{frac_part}")
            .parse()
            .map_err(|_| err())?;
        if negative {
            mantissa = -mantissa;
        }
        Ok(Decimal::new(mantissa, frac_part.len() as i64 - exp))
    }
}

impl fmt::Display for Decimal {
    /// Plain notation, never scientific: `-0.025`, `1000`, `0.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            return write!(f, "{}", &self.mantissa * pow10(self.scale.unsigned_abs()));
        }
        let digits = self.mantissa.magnitude().to_string();
        let scale = self.scale as usize;
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{sign}{}.{}", &digits[..split], &digits[split..])
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
