//! Two-phase simplex solver (translates
//! `org/apache/commons/math/optimization/linear/SimplexSolver.java`).

use std::cmp::Ordering;

use cm_core::{
    errors::{Error, Result},
    Real,
};

use crate::comparison::{close, compare_to};
use crate::optimization::linear::tableau::SimplexTableau;
use crate::optimization::linear::{LinearConstraint, LinearObjectiveFunction};
use crate::optimization::{GoalType, PointValue};

/// Default epsilon of the pivot comparisons.
pub const DEFAULT_EPSILON: Real = 1e-6;

/// Default pivot budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Two-phase dense-tableau simplex solver.
///
/// Phase 1 drives the artificial variables out of the basis (when the
/// constraints require any); phase 2 optimizes the real objective.  Pivot
/// selection is most-negative reduced cost for the column and minimum
/// non-negative ratio for the row, first found winning ties, with all
/// comparisons `epsilon`-tolerant.  There is no anti-cycling rule: a
/// degenerate problem that cycles exhausts `max_iterations` and is
/// reported as such instead of hanging.
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    epsilon: Real,
    max_iterations: usize,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl SimplexSolver {
    /// Create a solver with the given comparison epsilon.
    pub fn new(epsilon: Real) -> Self {
        Self {
            epsilon,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the pivot budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Column of the most negative objective-row entry, if any.
    fn pivot_column(&self, tableau: &SimplexTableau) -> Option<usize> {
        let mut min_value = 0.0;
        let mut min_pos = None;
        for j in tableau.num_objective_rows()..tableau.width() - 1 {
            let entry = tableau.entry(0, j);
            if compare_to(entry, min_value, self.epsilon) == Ordering::Less {
                min_value = entry;
                min_pos = Some(j);
            }
        }
        min_pos
    }

    /// Row with the minimum non-negative ratio rhs / entry over rows with a
    /// (tolerantly) positive entry in the pivot column.
    fn pivot_row(&self, tableau: &SimplexTableau, col: usize) -> Option<usize> {
        let mut min_ratio = Real::MAX;
        let mut min_ratio_pos = None;
        for i in tableau.num_objective_rows()..tableau.height() {
            let rhs = tableau.entry(i, tableau.rhs_offset());
            let entry = tableau.entry(i, col);
            if compare_to(entry, 0.0, self.epsilon) == Ordering::Greater {
                let ratio = rhs / entry;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_ratio_pos = Some(i);
                }
            }
        }
        min_ratio_pos
    }

    /// One pivot of the simplex algorithm.
    fn iterate(&self, tableau: &mut SimplexTableau, iterations: &mut usize) -> Result<()> {
        *iterations += 1;
        if *iterations > self.max_iterations {
            return Err(Error::MaxIterationsExceeded {
                max: self.max_iterations,
            });
        }
        let pivot_col = self
            .pivot_column(tableau)
            .expect("iterate called on an optimal tableau");
        let pivot_row = self
            .pivot_row(tableau, pivot_col)
            .ok_or(Error::UnboundedSolution)?;
        tableau.pivot(pivot_row, pivot_col);
        Ok(())
    }

    /// Run phase 1 until the artificial objective has no improving column,
    /// then check it reached (numerically) zero.
    fn solve_phase1(&self, tableau: &mut SimplexTableau, iterations: &mut usize) -> Result<()> {
        if tableau.num_artificial_variables() == 0 {
            return Ok(());
        }
        while !tableau.is_optimal() {
            self.iterate(tableau, iterations)?;
        }
        if !close(tableau.entry(0, tableau.rhs_offset()), 0.0, self.epsilon) {
            return Err(Error::NoFeasibleSolution);
        }
        Ok(())
    }

    /// Solve the linear program.
    ///
    /// # Errors
    /// [`Error::NoFeasibleSolution`] when the constraints are
    /// contradictory; [`Error::UnboundedSolution`] when the objective is
    /// unbounded over the feasible region;
    /// [`Error::MaxIterationsExceeded`] when the pivot budget runs out.
    pub fn optimize(
        &self,
        f: &LinearObjectiveFunction,
        constraints: &[LinearConstraint],
        goal: GoalType,
        restrict_to_non_negative: bool,
    ) -> Result<PointValue> {
        let mut tableau =
            SimplexTableau::new(f, constraints, goal, restrict_to_non_negative, self.epsilon);
        let mut iterations = 0;

        self.solve_phase1(&mut tableau, &mut iterations)?;
        tableau.discard_artificial_variables();
        while !tableau.is_optimal() {
            self.iterate(&mut tableau, &mut iterations)?;
        }
        Ok(tableau.solution())
    }
}
