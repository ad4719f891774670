//! # commons-math
//!
//! A Rust translation of the numerical core of the
//! [Apache Commons Math](https://commons.apache.org/math/) library.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates.  Application code should depend on this
//! crate rather than the individual `cm-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! commons-math = "0.1"
//! ```
//!
//! ```rust
//! use commons_math::math::special::erf;
//!
//! let value = erf(1.0).unwrap();
//! assert!((value - 0.8427007929497149).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use cm_core as core;

/// Continued fractions, special functions, solvers, ODE integration, and
/// linear programming.
pub use cm_math as math;

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    #[test]
    fn facade_reaches_the_numerics() {
        // one call through each re-exported crate
        let x: crate::core::Real = 2.0;
        assert_abs_diff_eq!(
            crate::math::special::log_gamma(x),
            0.0,
            epsilon = 1e-14
        );
    }
}
