//! Optimization (translates `org/apache/commons/math/optimization/`).
//!
//! Only the linear-programming branch of the original hierarchy is carried:
//! goal types, the point/value result pair, and the simplex solver under
//! [`linear`].

pub mod linear;

use cm_core::Real;

/// Whether the objective function is to be maximized or minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalType {
    /// Maximize the objective.
    Maximize,
    /// Minimize the objective.
    Minimize,
}

/// An optimum: the point where it is attained and the objective value there.
#[derive(Debug, Clone, PartialEq)]
pub struct PointValue {
    point: Vec<Real>,
    value: Real,
}

impl PointValue {
    /// Create a point/value pair.
    pub fn new(point: Vec<Real>, value: Real) -> Self {
        Self { point, value }
    }

    /// The optimizing point.
    pub fn point(&self) -> &[Real] {
        &self.point
    }

    /// The objective value at the point.
    pub fn value(&self) -> Real {
        self.value
    }
}
