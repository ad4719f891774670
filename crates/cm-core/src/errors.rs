//! Error types for commons-math-rs.
//!
//! This module translates the Java library's exception hierarchy (rooted in
//! `MathException` / `MathRuntimeException`) to a single `thiserror`-derived
//! enum.  The argument-checking idiom
//! `MathRuntimeException.createIllegalArgumentException` maps to the
//! `ensure!` convenience macro defined here, and `MathRuntimeException`
//! itself to `fail!`.

use thiserror::Error;

/// The top-level error type used throughout commons-math-rs.
///
/// Lower-level components return the narrow variant that describes the
/// failure; higher-level components propagate these unchanged.  No variant
/// is ever swallowed and replaced by a fallback numeric value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error (maps to `MathRuntimeException`).
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated, e.g. an argument outside its documented
    /// domain (maps to `IllegalArgumentException`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// An iterative algorithm failed to converge
    /// (maps to `ConvergenceException`).
    #[error("failed to converge: {0}")]
    Convergence(String),

    /// An iterative algorithm diverged, typically a continued fraction
    /// whose convergents overflow or collapse to NaN.
    #[error("diverged: {0}")]
    Divergence(String),

    /// The iteration budget was exhausted
    /// (maps to `MaxIterationsExceededException`).
    #[error("maximal number of iterations ({max}) exceeded")]
    MaxIterationsExceeded {
        /// The iteration budget that was exhausted.
        max: usize,
    },

    /// The function-evaluation budget was exhausted
    /// (maps to `MaxEvaluationsExceededException`).
    #[error("maximal number of evaluations ({max}) exceeded")]
    TooManyEvaluations {
        /// The evaluation budget that was exhausted.
        max: usize,
    },

    /// A bracketing solver was given endpoints with function values of the
    /// same sign (maps to the non-bracketing `IllegalArgumentException` of
    /// the univariate solvers).  Callers may retry with a wider interval.
    #[error(
        "function values at endpoints do not have different signs: \
         f({lo}) = {f_lo}, f({hi}) = {f_hi}"
    )]
    NotBracketing {
        /// Lower interval endpoint.
        lo: f64,
        /// Upper interval endpoint.
        hi: f64,
        /// Function value at the lower endpoint.
        f_lo: f64,
        /// Function value at the upper endpoint.
        f_hi: f64,
    },

    /// The linear problem's constraints admit no feasible point
    /// (maps to `NoFeasibleSolutionException`).
    #[error("no feasible solution")]
    NoFeasibleSolution,

    /// The linear problem's objective is unbounded over the feasible region
    /// (maps to `UnboundedSolutionException`).
    #[error("unbounded solution")]
    UnboundedSolution,
}

/// Shorthand `Result` type used throughout commons-math-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check a precondition, returning `Err(Error::Precondition(...))` when it
/// does not hold.
///
/// # Example
/// ```
/// use cm_core::ensure;
/// fn positive(x: f64) -> cm_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use cm_core::fail;
/// fn always_err() -> cm_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
