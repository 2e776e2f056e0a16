//! Curve codec: points in, packed fixed-point layout out.
//!
//! [`CurveCodec::encode`] runs the full pipeline over a validated point
//! set: fit the monotone spline, normalize every coefficient slot to
//! `(sign, exponent, mantissa)`, and pack the sign and exponent fields
//! into 256-bit storage words.
//!
//! ## Slot layout
//!
//! Pieces are padded up to the capacity tier (4, 16 or 64) and each piece
//! owns four coefficient slots in `(y, c1, c2, c3)` order. The last real
//! piece carries only `y` and `c1`; its `c2`/`c3` slots, and every slot of
//! a padding piece, are emitted as all-zero. Sign and exponent arrays are
//! therefore always `capacity * 4` entries long, and the packed words are
//! a pure function of the input points.
//!
//! The pipeline stops at the first failure and never returns partial
//! output.

use crate::bitpack::{pack, BitDescriptor};
use crate::decimal::{Decimal, RoundingMode, PRECISION};
use crate::error::CurveError;
use crate::normalize::{normalize, NormalizedValue};
use crate::spline::MonotoneSpline;

/// Number of coefficient slots per piece: `y, c1, c2, c3`.
const SLOTS_PER_PIECE: usize = 4;

/// Capacity tier for the padded piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceBucket {
    /// Up to 4 pieces.
    B4,
    /// Up to 16 pieces.
    B16,
    /// Up to 64 pieces.
    B64,
}

impl PieceBucket {
    /// Smallest tier that holds `points` pieces.
    ///
    /// `points` must already be validated against the `2..=64` range.
    pub fn for_point_count(points: usize) -> Self {
        if points <= 4 {
            PieceBucket::B4
        } else if points <= 16 {
            PieceBucket::B16
        } else {
            PieceBucket::B64
        }
    }

    /// Total piece slots in this tier.
    pub fn capacity(self) -> usize {
        match self {
            PieceBucket::B4 => 4,
            PieceBucket::B16 => 16,
            PieceBucket::B64 => 64,
        }
    }
}

/// Curve encoder with a fixed arithmetic configuration.
///
/// The division scale and rounding mode are part of the output contract:
/// two codecs with the same configuration produce identical bits for the
/// same input on any platform.
#[derive(Debug, Clone)]
pub struct CurveCodec {
    scale: u32,
    mode: RoundingMode,
}

impl Default for CurveCodec {
    fn default() -> Self {
        CurveCodec {
            scale: PRECISION,
            mode: RoundingMode::HalfUp,
        }
    }
}

impl CurveCodec {
    /// Create a codec with the contract arithmetic ([`PRECISION`]
    /// fractional digits, half-up rounding).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit division scale and rounding mode.
    ///
    /// Only useful when targeting a consumer that was generated with the
    /// same non-default configuration.
    pub fn with_arithmetic(scale: u32, mode: RoundingMode) -> Self {
        CurveCodec { scale, mode }
    }

    /// Encode a point set into the packed curve layout.
    ///
    /// # Errors
    /// - [`CurveError::InvalidInputLength`] for point counts outside
    ///   `2..=64` or mismatched slice lengths.
    /// - [`CurveError::NonMonotonicDomain`] when `xs` is not strictly
    ///   increasing.
    /// - [`CurveError::ExponentOverflow`] when a coefficient's magnitude
    ///   falls outside the 8-bit exponent range.
    ///
    /// # Example
    /// ```
    /// use curvepack::CurveCodec;
    ///
    /// let codec = CurveCodec::new();
    /// let curve = codec
    ///     .encode_strs(&["0", "1"], &["0", "5"])
    ///     .unwrap();
    /// assert_eq!(curve.max_pieces(), 4);
    /// assert_eq!(curve.breakpoints, ["0", "1", "0", "0"]);
    /// ```
    pub fn encode(&self, xs: &[Decimal], ys: &[Decimal]) -> Result<EncodedCurve, CurveError> {
        let spline = MonotoneSpline::fit(xs, ys, self.scale, self.mode)?;
        let points = spline.point_count();
        let bucket = PieceBucket::for_point_count(points);
        let capacity = bucket.capacity();

        let mut breakpoints = Vec::with_capacity(capacity);
        let mut coefficients = Vec::with_capacity(capacity * SLOTS_PER_PIECE);
        let mut signs = Vec::with_capacity(capacity * SLOTS_PER_PIECE);
        let mut exponents = Vec::with_capacity(capacity * SLOTS_PER_PIECE);

        fn emit(
            slot: NormalizedValue,
            signs: &mut Vec<bool>,
            exponents: &mut Vec<u8>,
            coefficients: &mut Vec<String>,
        ) {
            signs.push(slot.sign);
            exponents.push(slot.exponent);
            coefficients.push(slot.mantissa.to_string());
        }

        for piece in 0..capacity {
            if piece < points {
                breakpoints.push(spline.breakpoints()[piece].to_string());
                let y = normalize(&spline.bases()[piece])?;
                let c1 = normalize(&spline.tangents()[piece])?;
                emit(y, &mut signs, &mut exponents, &mut coefficients);
                emit(c1, &mut signs, &mut exponents, &mut coefficients);
                if piece < points - 1 {
                    let c2 = normalize(&spline.quadratic()[piece])?;
                    let c3 = normalize(&spline.cubic()[piece])?;
                    emit(c2, &mut signs, &mut exponents, &mut coefficients);
                    emit(c3, &mut signs, &mut exponents, &mut coefficients);
                } else {
                    for _ in 0..2 {
                        emit(
                            NormalizedValue::padding(),
                            &mut signs,
                            &mut exponents,
                            &mut coefficients,
                        );
                    }
                }
            } else {
                breakpoints.push("0".to_string());
                for _ in 0..SLOTS_PER_PIECE {
                    emit(
                        NormalizedValue::padding(),
                        &mut signs,
                        &mut exponents,
                        &mut coefficients,
                    );
                }
            }
        }

        let sign_descriptors: Vec<BitDescriptor> =
            signs.iter().map(|&s| BitDescriptor::from_bool(s)).collect();
        let exponent_descriptors: Vec<BitDescriptor> = exponents
            .iter()
            .map(|&e| BitDescriptor::from_uint8(e))
            .collect();

        let mut sign_words = pack(&sign_descriptors)?.to_words();
        debug_assert_eq!(sign_words.len(), 1);
        let packed_signs = sign_words.swap_remove(0).to_string();
        let packed_exponents = pack(&exponent_descriptors)?
            .to_words()
            .iter()
            .map(|w| w.to_string())
            .collect();

        Ok(EncodedCurve {
            bucket,
            points,
            breakpoints,
            coefficients,
            signs,
            exponents,
            packed_signs,
            packed_exponents,
        })
    }

    /// Parse decimal literals and encode them.
    ///
    /// # Errors
    /// Everything [`CurveCodec::encode`] returns, plus
    /// [`CurveError::InvalidDecimal`] for unparseable literals.
    pub fn encode_strs(&self, xs: &[&str], ys: &[&str]) -> Result<EncodedCurve, CurveError> {
        let parse = |vals: &[&str]| -> Result<Vec<Decimal>, CurveError> {
            vals.iter().map(|s| s.parse()).collect()
        };
        self.encode(&parse(xs)?, &parse(ys)?)
    }
}

/// The packed curve layout, ready for on-chain storage.
///
/// All numeric payloads are decimal strings so the structure can be handed
/// to transaction builders without further conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodedCurve {
    bucket: PieceBucket,
    points: usize,
    /// Breakpoint x values, one per piece slot, `"0"` for padding.
    pub breakpoints: Vec<String>,
    /// Coefficient mantissas, four per piece slot in `(y, c1, c2, c3)`
    /// order, `"0"` for padding.
    pub coefficients: Vec<String>,
    /// Per-slot sign flags (true = non-negative), aligned with
    /// `coefficients`.
    pub signs: Vec<bool>,
    /// Per-slot 8-bit exponents, aligned with `coefficients`.
    pub exponents: Vec<u8>,
    /// The sign flags packed into one 256-bit word, as a decimal string.
    pub packed_signs: String,
    /// The exponents packed into 256-bit words, as decimal strings.
    pub packed_exponents: Vec<String>,
}

impl EncodedCurve {
    /// The capacity tier this curve was padded to.
    pub fn bucket(&self) -> PieceBucket {
        self.bucket
    }

    /// Total piece slots (`bucket().capacity()`).
    pub fn max_pieces(&self) -> usize {
        self.bucket.capacity()
    }

    /// Number of real (non-padding) pieces.
    pub fn point_count(&self) -> usize {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitpack::{unpack, PackedBits};
    use num_bigint::BigUint;

    fn encode(xs: &[&str], ys: &[&str]) -> Result<EncodedCurve, CurveError> {
        CurveCodec::new().encode_strs(xs, ys)
    }

    fn slot_value(curve: &EncodedCurve, slot: usize) -> Decimal {
        let mantissa: BigUint = curve.coefficients[slot].parse().unwrap();
        NormalizedValue {
            sign: curve.signs[slot],
            exponent: curve.exponents[slot],
            mantissa,
        }
        .to_decimal()
    }

    #[test]
    fn test_bucket_tiers() {
        assert_eq!(PieceBucket::for_point_count(2), PieceBucket::B4);
        assert_eq!(PieceBucket::for_point_count(4), PieceBucket::B4);
        assert_eq!(PieceBucket::for_point_count(5), PieceBucket::B16);
        assert_eq!(PieceBucket::for_point_count(16), PieceBucket::B16);
        assert_eq!(PieceBucket::for_point_count(17), PieceBucket::B64);
        assert_eq!(PieceBucket::for_point_count(64), PieceBucket::B64);
    }

    #[test]
    fn test_linear_curve_unit_tangents() {
        let curve = encode(&["0", "1", "2", "3"], &["0", "1", "2", "3"]).unwrap();
        assert_eq!(curve.bucket(), PieceBucket::B4);
        assert_eq!(curve.breakpoints, ["0", "1", "2", "3"]);

        // Every tangent slot decodes back to exactly 1
        for piece in 0..4 {
            assert_eq!(slot_value(&curve, piece * 4 + 1), Decimal::one());
        }
        // c2/c3 are zero everywhere (flat curvature plus the final piece)
        for piece in 0..4 {
            assert_eq!(slot_value(&curve, piece * 4 + 2), Decimal::zero());
            assert_eq!(slot_value(&curve, piece * 4 + 3), Decimal::zero());
        }
        // Base values decode to the inputs
        for (piece, y) in ["0", "1", "2", "3"].iter().enumerate() {
            assert_eq!(slot_value(&curve, piece * 4), y.parse().unwrap());
        }
    }

    #[test]
    fn test_two_point_segment() {
        let curve = encode(&["0", "1"], &["0", "5"]).unwrap();
        assert_eq!(curve.max_pieces(), 4);
        assert_eq!(curve.point_count(), 2);
        assert_eq!(curve.breakpoints, ["0", "1", "0", "0"]);

        // Both tangent slots carry 5
        assert_eq!(slot_value(&curve, 1), "5".parse().unwrap());
        assert_eq!(slot_value(&curve, 5), "5".parse().unwrap());
        assert_eq!(curve.exponents[1], 23);
        assert_eq!(curve.coefficients[1], "500000000000000000000000");

        // Two padding pieces are fully zero
        for slot in 8..16 {
            assert!(!curve.signs[slot]);
            assert_eq!(curve.exponents[slot], 0);
            assert_eq!(curve.coefficients[slot], "0");
        }
    }

    #[test]
    fn test_two_point_packed_words() {
        let curve = encode(&["0", "1"], &["0", "5"]).unwrap();

        // Sign bits, piece-major: 1111 1100 0000 0000 (zero values are
        // non-negative, padding is zero)
        assert_eq!(curve.packed_signs, "64512");

        // 16 exponent bytes in one word: slots 1, 4 and 5 carry 23
        let expected: BigUint = (BigUint::from(23u8) << (14 * 8))
            + (BigUint::from(23u8) << (11 * 8))
            + (BigUint::from(23u8) << (10 * 8));
        assert_eq!(curve.packed_exponents.len(), 1);
        assert_eq!(curve.packed_exponents[0], expected.to_string());
    }

    #[test]
    fn test_sign_flags_for_decreasing_curve() {
        let curve = encode(&["0", "1"], &["5", "0"]).unwrap();
        // y0 = 5 is positive, both tangents are -5
        assert!(curve.signs[0]);
        assert!(!curve.signs[1]);
        assert!(!curve.signs[5]);
        assert_eq!(slot_value(&curve, 1), "-5".parse().unwrap());
    }

    #[test]
    fn test_rejects_invalid_lengths() {
        let xs: Vec<String> = (0..65).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = xs.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            encode(&refs, &refs).unwrap_err(),
            CurveError::InvalidInputLength { xs: 65, ys: 65 }
        );
        assert_eq!(
            encode(&["0", "1", "2"], &["0", "1"]).unwrap_err(),
            CurveError::InvalidInputLength { xs: 3, ys: 2 }
        );
    }

    #[test]
    fn test_rejects_non_monotonic_domain() {
        assert_eq!(
            encode(&["1", "0", "2"], &["0", "1", "2"]).unwrap_err(),
            CurveError::NonMonotonicDomain { index: 1 }
        );
    }

    #[test]
    fn test_rejects_exponent_overflow() {
        // A y value of 1e30 pushes the shift counter below zero
        let err = encode(&["0", "1"], &["0", "1e30"]).unwrap_err();
        assert!(matches!(err, CurveError::ExponentOverflow { .. }));
    }

    #[test]
    fn test_invalid_decimal_literal() {
        let err = encode(&["0", "x"], &["0", "1"]).unwrap_err();
        assert!(matches!(err, CurveError::InvalidDecimal(_)));
    }

    #[test]
    fn test_b64_exponents_split_into_eight_words() {
        let xs: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let ys: Vec<String> = (0..20).map(|i| (i * i).to_string()).collect();
        let xr: Vec<&str> = xs.iter().map(|s| s.as_str()).collect();
        let yr: Vec<&str> = ys.iter().map(|s| s.as_str()).collect();
        let curve = encode(&xr, &yr).unwrap();

        assert_eq!(curve.bucket(), PieceBucket::B64);
        assert_eq!(curve.signs.len(), 256);
        assert_eq!(curve.exponents.len(), 256);
        assert_eq!(curve.packed_exponents.len(), 8);

        // Each word round-trips independently: reassembling the eight
        // 32-byte windows and unpacking them recovers the exponent array
        let mut bytes = Vec::with_capacity(256);
        for word in &curve.packed_exponents {
            let value: BigUint = word.parse().unwrap();
            let mut be = value.to_bytes_be();
            let mut window = vec![0u8; 32 - be.len()];
            window.append(&mut be);
            bytes.extend_from_slice(&window);
        }
        let widths = vec![8usize; 256];
        let packed = PackedBits::from_bytes(bytes, 2048);
        let recovered = unpack(&packed, &widths).unwrap();
        let values: Vec<u8> = recovered.iter().map(|d| d.value() as u8).collect();
        assert_eq!(values, curve.exponents);
    }

    #[test]
    fn test_output_shapes() {
        let curve = encode(&["0", "1", "2", "3", "4"], &["0", "1", "2", "3", "4"]).unwrap();
        assert_eq!(curve.bucket(), PieceBucket::B16);
        assert_eq!(curve.breakpoints.len(), 16);
        assert_eq!(curve.coefficients.len(), 64);
        assert_eq!(curve.signs.len(), 64);
        assert_eq!(curve.exponents.len(), 64);
        // 64 exponents * 8 bits = 512 bits = 2 words
        assert_eq!(curve.packed_exponents.len(), 2);
    }

    #[test]
    fn test_determinism() {
        let xs = ["0", "0.5", "2", "3.25", "7"];
        let ys = ["1", "1.25", "4", "4.5", "10"];
        let a = encode(&xs, &ys).unwrap();
        let b = encode(&xs, &ys).unwrap();
        assert_eq!(a, b);
    }
}
