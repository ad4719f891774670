//! Error function (translates `org/apache/commons/math/special/Erf.java`).

use cm_core::{errors::Result, Real};

use crate::special::gamma::{regularized_gamma_p, regularized_gamma_q};

// erf is evaluated through the regularized Gamma functions at a = 1/2;
// a tighter tolerance than the Gamma defaults keeps full double accuracy.
const ERF_EPSILON: Real = 1e-15;
const ERF_MAX_ITERATIONS: usize = 10_000;

/// The error function,
/// `erf(x) = 2/√π ∫₀ˣ e^{−t²} dt = sign(x) · P(1/2, x²)`.
///
/// Odd in `x`, with `erf(0) = 0`.
pub fn erf(x: Real) -> Result<Real> {
    if x == 0.0 {
        return Ok(0.0);
    }
    let ret = regularized_gamma_p(0.5, x * x, ERF_EPSILON, ERF_MAX_ITERATIONS)?;
    Ok(if x < 0.0 { -ret } else { ret })
}

/// The complementary error function, `erfc(x) = 1 − erf(x) = Q(1/2, x²)`
/// for `x >= 0`, reflected via `erfc(−x) = 2 − erfc(x)`.
pub fn erfc(x: Real) -> Result<Real> {
    if x == 0.0 {
        return Ok(1.0);
    }
    let q = regularized_gamma_q(0.5, x * x, ERF_EPSILON, ERF_MAX_ITERATIONS)?;
    Ok(if x < 0.0 { 2.0 - q } else { q })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn erf_at_zero() {
        assert_eq!(erf(0.0).unwrap(), 0.0);
        assert_eq!(erfc(0.0).unwrap(), 1.0);
    }

    #[test]
    fn erf_is_odd() {
        for &x in &[0.1, 0.5, 1.0, 2.5] {
            assert_abs_diff_eq!(
                erf(-x).unwrap(),
                -erf(x).unwrap(),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn known_values() {
        assert_abs_diff_eq!(erf(1.0).unwrap(), 0.842_700_792_949_714_9, epsilon = 1e-12);
        assert_abs_diff_eq!(erf(2.0).unwrap(), 0.995_322_265_018_952_7, epsilon = 1e-12);
    }

    #[test]
    fn matches_statrs() {
        for &x in &[-3.0, -1.2, -0.4, 0.3, 1.0, 2.2, 4.0] {
            assert_abs_diff_eq!(erf(x).unwrap(), statrs::function::erf::erf(x), epsilon = 1e-11);
            assert_abs_diff_eq!(
                erfc(x).unwrap(),
                statrs::function::erf::erfc(x),
                epsilon = 1e-11
            );
        }
    }

    #[test]
    fn complement_reflection() {
        // erfc(-x) = 2 - erfc(x)
        for &x in &[0.2, 1.0, 3.0] {
            assert_abs_diff_eq!(
                erfc(-x).unwrap(),
                2.0 - erfc(x).unwrap(),
                epsilon = 1e-14
            );
        }
    }

    proptest! {
        #[test]
        fn oddness_property(x in -5.0..5.0f64) {
            let plus = erf(x).unwrap();
            let minus = erf(-x).unwrap();
            prop_assert!((plus + minus).abs() < 1e-14);
        }
    }
}
