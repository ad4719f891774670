//! # cm-math
//!
//! The numerical core of commons-math-rs: the generic continued-fraction
//! evaluator, the Gamma/Beta/Erf special functions, bracketing 1-D root
//! solvers, embedded Runge-Kutta ODE integration with event detection, and
//! the two-phase simplex linear-program solver.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// 1D vector of reals (newtype over nalgebra).
pub mod array;

/// Floating-point comparison utilities.
pub mod comparison;

/// Generic continued-fraction evaluation.
pub mod continued_fraction;

/// 2D matrix of reals (newtype over nalgebra).
pub mod matrix;

/// Ordinary differential equation integrators and event detection.
pub mod ode;

/// Optimization: goal types and the linear (simplex) solver.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

/// Special functions: Gamma, Beta, Erf.
pub mod special;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use comparison::{close, compare_to};
pub use continued_fraction::ContinuedFraction;
pub use matrix::Matrix;
