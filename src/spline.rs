//! Monotone piecewise-cubic interpolation over exact decimals.
//!
//! Builds a Fritsch–Carlson monotone cubic Hermite spline: a piecewise
//! cubic that passes through every input point and never overshoots between
//! monotone neighbours. Segment `i` covers `[x_i, x_{i+1}]` and evaluates as
//!
//! ```text
//! y(x) = y_i + c1_i*t + c2_i*t^2 + c3_i*t^3,   t = x - x_i
//! ```
//!
//! Tangents are damped to zero at local extrema so a non-decreasing input
//! always yields a non-decreasing interpolant.
//!
//! All arithmetic is exact decimal except division, which is performed at
//! the configured scale and rounding mode; the operation order is fixed
//! (each segment divides once for `1/dx` and multiplies from there), so the
//! emitted coefficients are reproducible bit-for-bit.

use crate::decimal::{Decimal, RoundingMode};
use crate::error::CurveError;

/// Minimum number of input points.
pub const MIN_POINTS: usize = 2;

/// Maximum number of input points.
pub const MAX_POINTS: usize = 64;

/// A fitted monotone cubic Hermite spline.
///
/// For `n` input points there are `n` tangents (one per knot) and `n - 1`
/// quadratic/cubic coefficient pairs (one per segment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonotoneSpline {
    xs: Vec<Decimal>,
    ys: Vec<Decimal>,
    c1: Vec<Decimal>,
    c2: Vec<Decimal>,
    c3: Vec<Decimal>,
}

impl MonotoneSpline {
    /// Fit a spline through `(xs[i], ys[i])`.
    ///
    /// Divisions round to `scale` fractional digits per `mode`.
    ///
    /// # Errors
    /// - [`CurveError::InvalidInputLength`] when fewer than 2 or more than
    ///   64 points are given, or the slices differ in length.
    /// - [`CurveError::NonMonotonicDomain`] when `xs` is not strictly
    ///   increasing.
    pub fn fit(
        xs: &[Decimal],
        ys: &[Decimal],
        scale: u32,
        mode: RoundingMode,
    ) -> Result<Self, CurveError> {
        let n = xs.len();
        if !(MIN_POINTS..=MAX_POINTS).contains(&n) || ys.len() != n {
            return Err(CurveError::InvalidInputLength {
                xs: xs.len(),
                ys: ys.len(),
            });
        }

        let mut dxs = Vec::with_capacity(n - 1);
        let mut ms = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let dx = &xs[i + 1] - &xs[i];
            if dx.signum() <= 0 {
                return Err(CurveError::NonMonotonicDomain { index: i + 1 });
            }
            let dy = &ys[i + 1] - &ys[i];
            ms.push(dy.div(&dx, scale, mode)?);
            dxs.push(dx);
        }

        // Knot tangents: secants at the boundaries, a weighted harmonic
        // mean of the neighbouring secants at interior knots, zero at
        // local extrema (secant sign change or flat secant).
        let mut c1 = Vec::with_capacity(n);
        c1.push(ms[0].clone());
        for k in 1..n - 1 {
            if ms[k - 1].signum() * ms[k].signum() <= 0 {
                c1.push(Decimal::zero());
            } else {
                let dx_sum = &dxs[k - 1] + &dxs[k];
                let numer = &Decimal::from(3) * &dx_sum;
                let left = (&dx_sum + &dxs[k]).div(&ms[k - 1], scale, mode)?;
                let right = (&dx_sum + &dxs[k - 1]).div(&ms[k], scale, mode)?;
                c1.push(numer.div(&(&left + &right), scale, mode)?);
            }
        }
        c1.push(ms[n - 2].clone());

        let mut c2 = Vec::with_capacity(n - 1);
        let mut c3 = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let inv_dx = Decimal::one().div(&dxs[i], scale, mode)?;
            let common = &(&c1[i] + &c1[i + 1]) - &(&ms[i] + &ms[i]);
            c2.push(&(&(&ms[i] - &c1[i]) - &common) * &inv_dx);
            c3.push(&(&common * &inv_dx) * &inv_dx);
        }

        Ok(MonotoneSpline {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            c1,
            c2,
            c3,
        })
    }

    /// Number of input points.
    pub fn point_count(&self) -> usize {
        self.xs.len()
    }

    /// Number of cubic segments (`point_count() - 1`).
    pub fn segment_count(&self) -> usize {
        self.xs.len() - 1
    }

    /// Breakpoint x values.
    pub fn breakpoints(&self) -> &[Decimal] {
        &self.xs
    }

    /// Base values `y_i`, one per knot.
    pub fn bases(&self) -> &[Decimal] {
        &self.ys
    }

    /// Tangents `c1_i`, one per knot.
    pub fn tangents(&self) -> &[Decimal] {
        &self.c1
    }

    /// Quadratic coefficients `c2_i`, one per segment.
    pub fn quadratic(&self) -> &[Decimal] {
        &self.c2
    }

    /// Cubic coefficients `c3_i`, one per segment.
    pub fn cubic(&self) -> &[Decimal] {
        &self.c3
    }

    /// Evaluate the spline at `x`.
    ///
    /// Exact knot hits return the stored `y_i`. Other positions evaluate
    /// the covering segment's cubic (clamped to the outermost segments
    /// when `x` lies outside the knot span); the polynomial evaluation
    /// itself is exact decimal arithmetic.
    pub fn evaluate(&self, x: &Decimal) -> Decimal {
        if let Some(i) = self.xs.iter().position(|k| k == x) {
            return self.ys[i].clone();
        }
        let mut seg = 0;
        for (i, k) in self.xs[..self.xs.len() - 1].iter().enumerate() {
            if x > k {
                seg = i;
            }
        }
        let t = x - &self.xs[seg];
        let t2 = &t * &t;
        let t3 = &t2 * &t;
        &(&(&self.ys[seg] + &(&self.c1[seg] * &t)) + &(&self.c2[seg] * &t2))
            + &(&self.c3[seg] * &t3)
    }
}
