//! Special functions (translates `org/apache/commons/math/special/`).
//!
//! Provides the Gamma family (log-gamma, regularized incomplete gamma,
//! digamma, trigamma), the regularized incomplete Beta function, and the
//! error functions, all built on the generic continued-fraction evaluator
//! and the Lanczos log-gamma approximation.

pub mod beta;
pub mod erf;
pub mod gamma;

pub use beta::{log_beta, regularized_beta, regularized_beta_default};
pub use erf::{erf, erfc};
pub use gamma::{
    digamma, log_gamma, regularized_gamma_p, regularized_gamma_p_default, regularized_gamma_q,
    regularized_gamma_q_default, trigamma,
};
