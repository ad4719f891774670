//! `Array` — a one-dimensional vector of reals (translates
//! `org/apache/commons/math/linear/ArrayRealVector.java`, trimmed to what the
//! linear-optimization module needs).
//!
//! This is a thin newtype around `nalgebra::DVector<f64>` exposing indexing,
//! dot products, and slice access.

use cm_core::Real;
use nalgebra::DVector;
use std::ops::{Index, IndexMut};

/// A dynamically-sized 1D vector of `Real` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Array(DVector<Real>);

impl Array {
    /// Create a zero-filled array of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self(DVector::zeros(n))
    }

    /// Create an array from a slice.
    pub fn from_slice(data: &[Real]) -> Self {
        Self(DVector::from_column_slice(data))
    }

    /// Create an array from a `Vec`.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Self(DVector::from_vec(data))
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the elements as a slice.
    pub fn as_slice(&self) -> &[Real] {
        self.0.as_slice()
    }

    /// Dot product with another array.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn dot(&self, other: &Array) -> Real {
        self.0.dot(&other.0)
    }

    /// Dot product with a plain slice.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn dot_slice(&self, other: &[Real]) -> Real {
        assert_eq!(self.size(), other.len(), "length mismatch in dot product");
        self.as_slice()
            .iter()
            .zip(other)
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Real {
        self.0.sum()
    }

    /// Borrow the inner `DVector`.
    pub fn inner(&self) -> &DVector<Real> {
        &self.0
    }
}

impl Index<usize> for Array {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

impl From<Vec<Real>> for Array {
    fn from(data: Vec<Real>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_and_indexing() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(a.size(), 3);
        assert_eq!(a[1], 2.0);

        let mut b = Array::zeros(2);
        b[0] = 5.0;
        assert_eq!(b.as_slice(), &[5.0, 0.0]);
    }

    #[test]
    fn dot_and_sum() {
        let a = Array::from_slice(&[1.0, 2.0, 3.0]);
        let b = Array::from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(a.dot(&b), 32.0);
        assert_eq!(a.dot_slice(&[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(a.sum(), 6.0);
    }
}
