//! 1D root-finding solvers (translates
//! `org/apache/commons/math/analysis/solvers/`).
//!
//! Both solvers require a bracket `[min, max]` with a sign change and
//! enforce a function-evaluation budget.  [`BisectionSolver`] additionally
//! supports forced-side resolution: callers can demand a result at or
//! before, or at or after, the exact crossing.  The ODE event detector
//! relies on this to avoid re-detecting an event it has just handled.

use cm_core::{
    errors::{Error, Result},
    Real,
};

/// Default absolute accuracy of the solvers.
pub const DEFAULT_ABSOLUTE_ACCURACY: Real = 1e-6;

/// Default function-evaluation budget.
pub const DEFAULT_MAX_EVALUATIONS: usize = 1_000;

/// Which side of the exact root an accepted result must lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedSolution {
    /// Any value within the accuracy of the root is acceptable.
    AnySide,
    /// The result must be at or before the root.
    LeftSide,
    /// The result must be at or after the root.
    RightSide,
}

fn evaluate<F>(f: &mut F, x: Real, evaluations: &mut usize, max: usize) -> Result<Real>
where
    F: FnMut(Real) -> Real,
{
    if *evaluations >= max {
        return Err(Error::TooManyEvaluations { max });
    }
    *evaluations += 1;
    Ok(f(x))
}

// ── Bisection ────────────────────────────────────────────────────────────────

/// Bisection solver with guaranteed absolute accuracy.
///
/// Corresponds to `o.a.c.math.analysis.solvers.BisectionSolver`, extended
/// with the allowed-side contract of `BracketedUnivariateRealSolver`.
#[derive(Debug, Clone)]
pub struct BisectionSolver {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl Default for BisectionSolver {
    fn default() -> Self {
        Self::new(DEFAULT_ABSOLUTE_ACCURACY)
    }
}

impl BisectionSolver {
    /// Create a solver with the given absolute accuracy.
    pub fn new(absolute_accuracy: Real) -> Self {
        Self {
            absolute_accuracy: absolute_accuracy.abs(),
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }

    /// Set the function-evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// The configured absolute accuracy.
    pub fn absolute_accuracy(&self) -> Real {
        self.absolute_accuracy
    }

    /// Find a root of `f` in `[min, max]`, any side.
    pub fn solve<F>(&self, f: F, min: Real, max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        self.solve_allowed(f, min, max, AllowedSolution::AnySide)
    }

    /// Find a root of `f` in `[min, max]`, restricted to the given side of
    /// the exact root.
    ///
    /// The sign-change invariant `f(lo) · f(hi) <= 0` is maintained through
    /// every bisection, so on termination the bracket still contains the
    /// root and either endpoint is a valid one-sided answer.
    ///
    /// # Errors
    /// [`Error::Precondition`] if `min >= max`;
    /// [`Error::NotBracketing`] if `f(min)` and `f(max)` have the same sign;
    /// [`Error::TooManyEvaluations`] if the budget runs out.
    pub fn solve_allowed<F>(
        &self,
        mut f: F,
        min: Real,
        max: Real,
        allowed: AllowedSolution,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        cm_core::ensure!(min < max, "invalid interval: [{min}, {max}]");

        let mut evaluations = 0;
        let mut lo = min;
        let mut hi = max;

        let mut f_lo = evaluate(&mut f, lo, &mut evaluations, self.max_evaluations)?;
        if f_lo == 0.0 {
            return Ok(lo);
        }
        let f_hi = evaluate(&mut f, hi, &mut evaluations, self.max_evaluations)?;
        if f_hi == 0.0 {
            return Ok(hi);
        }
        if f_lo * f_hi > 0.0 {
            return Err(Error::NotBracketing {
                lo: min,
                hi: max,
                f_lo,
                f_hi,
            });
        }

        loop {
            if hi - lo <= self.absolute_accuracy {
                return Ok(match allowed {
                    AllowedSolution::AnySide => 0.5 * (lo + hi),
                    AllowedSolution::LeftSide => lo,
                    AllowedSolution::RightSide => hi,
                });
            }
            let mid = 0.5 * (lo + hi);
            let f_mid = evaluate(&mut f, mid, &mut evaluations, self.max_evaluations)?;
            if f_mid == 0.0 {
                // an exact root satisfies every side
                return Ok(mid);
            }
            if f_lo * f_mid < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }
    }
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method: combines bisection, secant, and inverse quadratic
/// interpolation.
///
/// Converges superlinearly on well-behaved functions while retaining the
/// bisection guarantee.  The result may land on either side of the exact
/// root; callers needing one-sided resolution use [`BisectionSolver`].
///
/// Corresponds to `o.a.c.math.analysis.solvers.BrentSolver`.
#[derive(Debug, Clone)]
pub struct BrentSolver {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl Default for BrentSolver {
    fn default() -> Self {
        Self::new(DEFAULT_ABSOLUTE_ACCURACY)
    }
}

impl BrentSolver {
    /// Create a solver with the given absolute accuracy.
    pub fn new(absolute_accuracy: Real) -> Self {
        Self {
            absolute_accuracy: absolute_accuracy.abs(),
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }

    /// Set the function-evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Find a root of `f` in `[x_min, x_max]`.
    ///
    /// # Errors
    /// [`Error::Precondition`] if `x_min >= x_max`;
    /// [`Error::NotBracketing`] if the endpoints do not bracket a root;
    /// [`Error::TooManyEvaluations`] if the budget runs out.
    pub fn solve<F>(&self, mut f: F, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        cm_core::ensure!(x_min < x_max, "invalid interval: [{x_min}, {x_max}]");

        let mut evaluations = 0;
        let mut a = x_min;
        let mut b = x_max;
        let mut fa = evaluate(&mut f, a, &mut evaluations, self.max_evaluations)?;
        let mut fb = evaluate(&mut f, b, &mut evaluations, self.max_evaluations)?;

        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa * fb > 0.0 {
            return Err(Error::NotBracketing {
                lo: x_min,
                hi: x_max,
                f_lo: fa,
                f_hi: fb,
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        loop {
            if fb * fc > 0.0 {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.absolute_accuracy;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }
            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (p, q) = if a == c {
                    // secant step
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    // inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;
                    let p = s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0));
                    let q = (q - 1.0) * (r - 1.0) * (s - 1.0);
                    (p, q)
                };
                let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
                if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol {
                d
            } else if xm > 0.0 {
                tol
            } else {
                -tol
            };
            fb = evaluate(&mut f, b, &mut evaluations, self.max_evaluations)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bisection_sqrt2() {
        let solver = BisectionSolver::new(1e-12);
        let root = solver.solve(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-11, "got {root}");
    }

    #[test]
    fn bisection_opposite_signs_required() {
        let solver = BisectionSolver::new(1e-10);
        let result = solver.solve(|x| x, 1.0, 2.0);
        assert!(matches!(result, Err(Error::NotBracketing { .. })));
    }

    #[test]
    fn bisection_budget() {
        let solver = BisectionSolver::new(1e-15).with_max_evaluations(5);
        let result = solver.solve(|x| x * x - 2.0, 0.0, 2.0);
        assert!(matches!(result, Err(Error::TooManyEvaluations { max: 5 })));
    }

    #[test]
    fn forced_side_brackets_the_root() {
        let solver = BisectionSolver::new(1e-9);
        let exact = 2.0_f64.sqrt();
        let left = solver
            .solve_allowed(|x| x * x - 2.0, 0.0, 2.0, AllowedSolution::LeftSide)
            .unwrap();
        let right = solver
            .solve_allowed(|x| x * x - 2.0, 0.0, 2.0, AllowedSolution::RightSide)
            .unwrap();
        assert!(left <= exact, "left-side result {left} past the root");
        assert!(right >= exact, "right-side result {right} before the root");
        assert!((left - exact).abs() < 1e-8);
        assert!((right - exact).abs() < 1e-8);
    }

    #[test]
    fn exact_endpoint_root() {
        let solver = BisectionSolver::new(1e-10);
        assert_eq!(solver.solve(|x| x, 0.0, 1.0).unwrap(), 0.0);
        assert_eq!(solver.solve(|x| x - 1.0, 0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn brent_sqrt2() {
        let solver = BrentSolver::new(1e-12);
        let root = solver.solve(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-10, "got {root}");
    }

    #[test]
    fn brent_sin() {
        let solver = BrentSolver::new(1e-12);
        let root = solver.solve(|x| x.sin(), 2.0, 4.0).unwrap();
        assert!((root - std::f64::consts::PI).abs() < 1e-10, "got {root}");
    }

    #[test]
    fn brent_opposite_signs_required() {
        let solver = BrentSolver::default();
        assert!(solver.solve(|x| x, 1.0, 2.0).is_err());
    }

    proptest! {
        #[test]
        fn bisection_is_deterministic(target in 0.1..10.0f64) {
            // identical bracket and tolerance must give identical results
            let solver = BisectionSolver::new(1e-10);
            let a = solver.solve(|x| x - target, 0.0, 16.0).unwrap();
            let b = solver.solve(|x| x - target, 0.0, 16.0).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!((a - target).abs() < 1e-9);
        }
    }
}
