//! # cm-core
//!
//! Core types and error definitions for commons-math-rs.
//!
//! This crate provides the foundational building blocks shared across the
//! workspace – the primitive type aliases and the error enum that the Java
//! library's exception hierarchy maps onto.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library (maps to Java `double`).
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
