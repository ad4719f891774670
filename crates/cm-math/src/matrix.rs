//! `Matrix` — a two-dimensional matrix of reals (translates
//! `org/apache/commons/math/linear/Array2DRowRealMatrix.java`, trimmed to
//! what the simplex tableau needs).
//!
//! This is a thin newtype around `nalgebra::DMatrix<f64>` that exposes
//! row-major indexing and the elementary row operations used by tableau
//! pivoting.

use cm_core::Real;
use nalgebra::DMatrix;
use std::ops::{Index, IndexMut};

/// A dynamically-sized 2D matrix of `Real` values (row-major access).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix(DMatrix<Real>);

impl Matrix {
    /// Create a zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }

    /// Create from a row-major data slice.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[Real]) -> Self {
        Self(DMatrix::from_row_slice(rows, cols, data))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Extract a row as a `Vec`.
    pub fn row(&self, i: usize) -> Vec<Real> {
        self.0.row(i).iter().copied().collect()
    }

    /// Divide every entry of row `i` by `divisor`.
    pub fn divide_row(&mut self, i: usize, divisor: Real) {
        for j in 0..self.0.ncols() {
            self.0[(i, j)] /= divisor;
        }
    }

    /// Subtract `factor` times row `src` from row `dst`.
    pub fn subtract_scaled_row(&mut self, dst: usize, src: usize, factor: Real) {
        for j in 0..self.0.ncols() {
            let v = self.0[(src, j)];
            self.0[(dst, j)] -= factor * v;
        }
    }

    /// Borrow the inner `DMatrix`.
    pub fn inner(&self) -> &DMatrix<Real> {
        &self.0
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Real;
    fn index(&self, ij: (usize, usize)) -> &Real {
        &self.0[ij]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, ij: (usize, usize)) -> &mut Real {
        &mut self.0[ij]
    }
}
