//! Generic continued-fraction evaluation (translates
//! `org/apache/commons/math/util/ContinuedFraction.java`).
//!
//! A continued fraction is defined by two coefficient functions `a(n, x)`
//! and `b(n, x)`:
//!
//! ```text
//!                        b₁
//! f(x) = a₀ + ───────────────────────
//!                           b₂
//!              a₁ + ─────────────────
//!                    a₂ + …
//! ```
//!
//! Evaluation uses the Wallis recurrence on the convergent numerators and
//! denominators, with rescaling when either overflows.

use cm_core::{
    errors::{Error, Result},
    Real,
};

/// Default convergence tolerance for [`ContinuedFraction::evaluate_default`].
pub const DEFAULT_EPSILON: Real = 1e-9;

/// Default iteration budget for [`ContinuedFraction::evaluate_default`].
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Maximum number of rescaling attempts when a convergent overflows.
const MAX_RESCALES: usize = 5;

/// A continued fraction with coefficient functions supplied per evaluation.
///
/// `a` yields the partial denominators `a(n, x)` (the `n = 0` value is the
/// leading term), `b` the partial numerators `b(n, x)` for `n >= 1`.  Both
/// must be pure functions; no state persists beyond an `evaluate` call.
pub struct ContinuedFraction<A, B>
where
    A: Fn(usize, Real) -> Real,
    B: Fn(usize, Real) -> Real,
{
    a: A,
    b: B,
}

impl<A, B> ContinuedFraction<A, B>
where
    A: Fn(usize, Real) -> Real,
    B: Fn(usize, Real) -> Real,
{
    /// Create a continued fraction from its coefficient functions.
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }

    /// Evaluate with the default tolerance and iteration budget.
    pub fn evaluate_default(&self, x: Real) -> Result<Real> {
        self.evaluate(x, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS)
    }

    /// Evaluate the continued fraction at `x`.
    ///
    /// Iterates the Wallis recurrence
    /// `p₂ = a·p₁ + b·p₀`, `q₂ = a·q₁ + b·q₀` until the relative change of
    /// the convergent `p/q` between iterations drops to `epsilon`.
    ///
    /// # Errors
    /// - [`Error::Convergence`] when `max_iterations` is reached without the
    ///   relative-error criterion being met;
    /// - [`Error::Divergence`] when a convergent overflows and cannot be
    ///   rescaled, or collapses to NaN.
    pub fn evaluate(&self, x: Real, epsilon: Real, max_iterations: usize) -> Result<Real> {
        let mut p0: Real = 1.0;
        let mut p1: Real = (self.a)(0, x);
        let mut q0: Real = 0.0;
        let mut q1: Real = 1.0;
        let mut c = p1 / q1;
        let mut n = 0;
        let mut relative_error = Real::MAX;

        while n < max_iterations && relative_error > epsilon {
            n += 1;
            let a = (self.a)(n, x);
            let b = (self.b)(n, x);
            let mut p2 = a * p1 + b * p0;
            let mut q2 = a * q1 + b * q0;
            let mut infinite = false;

            if p2.is_infinite() || q2.is_infinite() {
                // The recurrence overflowed.  Dividing the running values
                // through by the dominant coefficient keeps the convergent
                // p/q unchanged while pulling the magnitudes back into
                // range; without it the evaluation dies at large n.
                let scale = a.abs().max(b.abs());
                if scale <= 0.0 {
                    return Err(Error::Divergence(format!(
                        "continued fraction cannot be rescaled: a = b = 0 at iteration {n} \
                         for value {x}"
                    )));
                }
                infinite = true;
                let mut scale_factor: Real = 1.0;
                for _ in 0..MAX_RESCALES {
                    let last_scale_factor = scale_factor;
                    scale_factor *= scale;
                    if a != 0.0 && a.abs() > b.abs() {
                        p2 = p1 / last_scale_factor + (b / scale_factor) * p0;
                        q2 = q1 / last_scale_factor + (b / scale_factor) * q0;
                    } else if b != 0.0 {
                        p2 = (a / scale_factor) * p1 + p0 / last_scale_factor;
                        q2 = (a / scale_factor) * q1 + q0 / last_scale_factor;
                    }
                    infinite = p2.is_infinite() || q2.is_infinite();
                    if !infinite {
                        break;
                    }
                }
            }

            if infinite {
                return Err(Error::Divergence(format!(
                    "continued fraction diverged to infinity at iteration {n} for value {x}"
                )));
            }

            let r = p2 / q2;
            if r.is_nan() {
                return Err(Error::Divergence(format!(
                    "continued fraction diverged to NaN at iteration {n} for value {x}"
                )));
            }
            relative_error = (r / c - 1.0).abs();

            c = r;
            p0 = p1;
            p1 = p2;
            q0 = q1;
            q1 = q2;
        }

        if relative_error > epsilon {
            return Err(Error::Convergence(format!(
                "continued fraction failed to converge within {max_iterations} iterations \
                 for value {x}"
            )));
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_ratio() {
        // a(n) = b(n) = 1 converges to (1 + sqrt 5) / 2
        let cf = ContinuedFraction::new(|_, _| 1.0, |_, _| 1.0);
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let value = cf.evaluate(0.0, 1e-12, 1000).unwrap();
        assert!((value - phi).abs() < 1e-10, "got {value}, expected {phi}");
    }

    #[test]
    fn budget_exhaustion() {
        let cf = ContinuedFraction::new(|_, _| 1.0, |_, _| 1.0);
        let result = cf.evaluate(0.0, 1e-15, 1);
        assert!(matches!(result, Err(Error::Convergence(_))), "got {result:?}");
    }

    #[test]
    fn rescaling_survives_huge_coefficients() {
        // Partial denominators near the overflow threshold force the
        // rescaling branch; the convergent itself stays finite.
        let cf = ContinuedFraction::new(|n, _| if n == 0 { 1.0 } else { 1e300 }, |_, _| 1.0);
        let value = cf.evaluate(0.0, 1e-12, 100).unwrap();
        assert!(value.is_finite());
        assert!((value - 1.0).abs() < 1e-10, "got {value}");
    }

    #[test]
    fn exact_leading_term() {
        // b(n) = 0 collapses the fraction to its leading term immediately.
        let cf = ContinuedFraction::new(|n, _| if n == 0 { 42.0 } else { 1.0 }, |_, _| 0.0);
        assert_eq!(cf.evaluate(0.0, 1e-12, 10).unwrap(), 42.0);
    }
}
