//! Floating-point comparison utilities (translates the comparison helpers of
//! `org/apache/commons/math/util/MathUtils.java`).

use cm_core::Real;
use std::cmp::Ordering;

/// Default epsilon for close-enough comparisons.
pub const EPSILON: Real = 1e-10;

/// Return `true` if `|a - b| <= epsilon`.
#[inline]
pub fn close(a: Real, b: Real, epsilon: Real) -> bool {
    (a - b).abs() <= epsilon
}

/// Epsilon-tolerant three-way comparison.
///
/// Values within `epsilon` of each other compare `Equal`.  This is the
/// comparison the simplex pivoting rules use; exact floating-point
/// comparison would make pivot selection unstable.
#[inline]
pub fn compare_to(x: Real, y: Real, epsilon: Real) -> Ordering {
    if x < y - epsilon {
        Ordering::Less
    } else if x > y + epsilon {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_basic() {
        assert!(close(1.0, 1.0 + 1e-11, 1e-10));
        assert!(!close(1.0, 1.0 + 1e-9, 1e-10));
    }

    #[test]
    fn compare_to_tolerates_epsilon() {
        assert_eq!(compare_to(1.0, 1.0 + 1e-12, 1e-10), Ordering::Equal);
        assert_eq!(compare_to(1.0, 2.0, 1e-10), Ordering::Less);
        assert_eq!(compare_to(2.0, 1.0, 1e-10), Ordering::Greater);
        assert_eq!(compare_to(0.0, -1e-11, 1e-10), Ordering::Equal);
    }
}
