//! Gamma-family special functions (translates
//! `org/apache/commons/math/special/Gamma.java`).

use cm_core::{
    errors::{Error, Result},
    Real,
};

use crate::continued_fraction::ContinuedFraction;

/// Default convergence tolerance for the convenience wrappers.
pub const DEFAULT_EPSILON: Real = 1e-14;

/// Default iteration budget for the convenience wrappers.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Lanczos coefficients (Godfrey's table, g = 607/128).
const LANCZOS: [Real; 15] = [
    0.99999999999999709182,
    57.156235665862923517,
    -59.597960355475491248,
    14.136097974741747174,
    -0.49191381609762019978,
    0.33994649984811888699e-4,
    0.46523628927048575665e-4,
    -0.98374475304879564677e-4,
    0.15808870322491248884e-3,
    -0.21026444172410488319e-3,
    0.21743961811521264320e-3,
    -0.16431810653676389022e-3,
    0.84418223983852743293e-4,
    -0.26190838401581408670e-4,
    0.36899182659531622704e-5,
];

/// ln(2π)/2, the constant term of the Lanczos form.
const HALF_LOG_2_PI: Real = 0.918_938_533_204_672_741_8;

const LANCZOS_G: Real = 607.0 / 128.0;

// limits below/above which digamma switches formula
const S_LIMIT: Real = 1e-5;
const C_LIMIT: Real = 49.0;

/// Euler-Mascheroni constant γ.
const GAMMA: Real = 0.577_215_664_901_532_9;

/// Natural logarithm of the Gamma function, ln Γ(x).
///
/// Uses the Lanczos approximation, which is accurate over the whole
/// positive real line.  Returns NaN for `x <= 0` or NaN input.
pub fn log_gamma(x: Real) -> Real {
    if x.is_nan() || x <= 0.0 {
        return Real::NAN;
    }
    let mut sum = 0.0;
    for i in (1..LANCZOS.len()).rev() {
        sum += LANCZOS[i] / (x + i as Real);
    }
    sum += LANCZOS[0];
    let tmp = x + LANCZOS_G + 0.5;
    (x + 0.5) * tmp.ln() - tmp + HALF_LOG_2_PI + (sum / x).ln()
}

/// Regularized lower incomplete Gamma function P(a, x), with default
/// tolerance and iteration budget.
pub fn regularized_gamma_p_default(a: Real, x: Real) -> Result<Real> {
    regularized_gamma_p(a, x, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS)
}

/// Regularized lower incomplete Gamma function P(a, x).
///
/// `P(a, x) = γ(a, x) / Γ(a)` where `γ` is the lower incomplete Gamma
/// integral.  For `a >= 1` and `x > a` the complement Q converges faster,
/// so P is derived by subtraction in that regime; otherwise the lower
/// power series is summed directly.
///
/// # Errors
/// [`Error::Precondition`] for `a <= 0`, `x < 0`, or NaN arguments;
/// [`Error::Convergence`] when the series does not converge within
/// `max_iterations`.
pub fn regularized_gamma_p(
    a: Real,
    x: Real,
    epsilon: Real,
    max_iterations: usize,
) -> Result<Real> {
    cm_core::ensure!(
        !a.is_nan() && !x.is_nan() && a > 0.0 && x >= 0.0,
        "invalid arguments (a, x) = ({a}, {x}) for regularized gamma P"
    );
    if x == 0.0 {
        return Ok(0.0);
    }
    if a >= 1.0 && x > a {
        // the continued fraction for Q converges faster here
        return Ok(1.0 - regularized_gamma_q(a, x, epsilon, max_iterations)?);
    }

    // lower series: sum_{n>=0} x^n / (a (a+1) ... (a+n))
    let mut n = 0;
    let mut an = 1.0 / a;
    let mut sum = an;
    while (an / sum).abs() > epsilon && n < max_iterations && sum < Real::INFINITY {
        n += 1;
        an *= x / (a + n as Real);
        sum += an;
    }
    if n >= max_iterations {
        return Err(Error::Convergence(format!(
            "series for regularized gamma P({a}, {x}) failed to converge \
             within {max_iterations} iterations"
        )));
    }
    if sum.is_infinite() {
        return Ok(1.0);
    }
    Ok((-x + a * x.ln() - log_gamma(a)).exp() * sum)
}

/// Regularized upper incomplete Gamma function Q(a, x), with default
/// tolerance and iteration budget.
pub fn regularized_gamma_q_default(a: Real, x: Real) -> Result<Real> {
    regularized_gamma_q(a, x, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS)
}

/// Regularized upper incomplete Gamma function Q(a, x) = 1 − P(a, x).
///
/// For `a >= 1` and `x > a` the continued fraction with coefficients
/// `a(n) = 2n + 1 − a + x`, `b(n) = n (a − n)` is evaluated directly;
/// otherwise Q is derived from the series for P.
///
/// # Errors
/// Same contract as [`regularized_gamma_p`], plus [`Error::Divergence`]
/// propagated from the continued fraction.
pub fn regularized_gamma_q(
    a: Real,
    x: Real,
    epsilon: Real,
    max_iterations: usize,
) -> Result<Real> {
    cm_core::ensure!(
        !a.is_nan() && !x.is_nan() && a > 0.0 && x >= 0.0,
        "invalid arguments (a, x) = ({a}, {x}) for regularized gamma Q"
    );
    if x == 0.0 {
        return Ok(1.0);
    }
    if !(a >= 1.0 && x > a) {
        return Ok(1.0 - regularized_gamma_p(a, x, epsilon, max_iterations)?);
    }

    let cf = ContinuedFraction::new(
        move |n, x| (2 * n + 1) as Real - a + x,
        move |n, _| {
            let n = n as Real;
            n * (a - n)
        },
    );
    let ret = 1.0 / cf.evaluate(x, epsilon, max_iterations)?;
    Ok((-x + a * x.ln() - log_gamma(a)).exp() * ret)
}

/// Digamma function ψ(x), the logarithmic derivative of Γ.
///
/// Uses the Gauss asymptotic series above `x = 49` and the recurrence
/// `ψ(x) = ψ(x + 1) − 1/x` to shift smaller arguments into that range.
/// Accurate to about 1e-8 over the positive reals.
pub fn digamma(x: Real) -> Real {
    if x > 0.0 && x <= S_LIMIT {
        // small-x limit of ψ(x) = -γ - 1/x + O(x)
        return -GAMMA - 1.0 / x;
    }
    if x >= C_LIMIT {
        let inv = 1.0 / (x * x);
        return x.ln() - 0.5 / x - inv * (1.0 / 12.0 + inv * (1.0 / 120.0 - inv / 252.0));
    }
    digamma(x + 1.0) - 1.0 / x
}

/// Trigamma function ψ₁(x), the derivative of [`digamma`].
pub fn trigamma(x: Real) -> Real {
    if x > 0.0 && x <= S_LIMIT {
        return 1.0 / (x * x);
    }
    if x >= C_LIMIT {
        let inv = 1.0 / (x * x);
        return 1.0 / x + inv / 2.0 + inv / x * (1.0 / 6.0 - inv * (1.0 / 30.0 - inv / 42.0));
    }
    trigamma(x + 1.0) + 1.0 / (x * x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn log_gamma_integers() {
        // Γ(n) = (n-1)!
        assert_abs_diff_eq!(log_gamma(1.0), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(log_gamma(2.0), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(log_gamma(5.0), 24.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn log_gamma_domain() {
        assert!(log_gamma(0.0).is_nan());
        assert!(log_gamma(-1.5).is_nan());
        assert!(log_gamma(Real::NAN).is_nan());
    }

    #[test]
    fn log_gamma_matches_statrs() {
        for &x in &[0.1, 0.5, 1.5, 3.0, 8.5, 40.0, 500.0, 1e6] {
            let expected = statrs::function::gamma::ln_gamma(x);
            assert_abs_diff_eq!(log_gamma(x), expected, epsilon = 1e-10 * (1.0 + expected.abs()));
        }
    }

    #[test]
    fn p_plus_q_is_one() {
        for &a in &[0.1, 0.5, 1.0, 2.5, 10.0] {
            for &x in &[0.0, 0.1, 1.0, 2.5, 10.0, 100.0] {
                let p = regularized_gamma_p_default(a, x).unwrap();
                let q = regularized_gamma_q_default(a, x).unwrap();
                assert!((0.0..=1.0).contains(&p), "P({a}, {x}) = {p}");
                assert!((0.0..=1.0).contains(&q), "Q({a}, {x}) = {q}");
                assert_abs_diff_eq!(p + q, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn regularized_gamma_matches_statrs() {
        for &a in &[0.3, 1.0, 2.0, 7.5] {
            for &x in &[0.2, 1.0, 4.0, 20.0] {
                let p = regularized_gamma_p_default(a, x).unwrap();
                assert_abs_diff_eq!(
                    p,
                    statrs::function::gamma::gamma_lr(a, x),
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn exponential_cdf_special_case() {
        // P(1, x) = 1 - e^{-x}
        let x = 1.5;
        let expected = 1.0 - (-x as Real).exp();
        assert_abs_diff_eq!(
            regularized_gamma_p_default(1.0, x).unwrap(),
            expected,
            epsilon = 1e-14
        );
    }

    #[test]
    fn domain_errors() {
        assert!(regularized_gamma_p_default(-1.0, 1.0).is_err());
        assert!(regularized_gamma_p_default(1.0, -1.0).is_err());
        assert!(regularized_gamma_q_default(0.0, 1.0).is_err());
        assert!(regularized_gamma_p_default(Real::NAN, 1.0).is_err());
    }

    #[test]
    fn digamma_known_values() {
        // ψ(1) = -γ
        assert_abs_diff_eq!(digamma(1.0), -GAMMA, epsilon = 1e-8);
        // recurrence ψ(x+1) = ψ(x) + 1/x
        for &x in &[0.3, 1.7, 12.0] {
            assert_abs_diff_eq!(digamma(x + 1.0), digamma(x) + 1.0 / x, epsilon = 1e-8);
        }
    }

    #[test]
    fn trigamma_known_values() {
        // ψ₁(1) = π²/6
        let pi2_6 = std::f64::consts::PI * std::f64::consts::PI / 6.0;
        assert_abs_diff_eq!(trigamma(1.0), pi2_6, epsilon = 1e-8);
    }
}
