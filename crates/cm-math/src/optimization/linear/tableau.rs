//! Simplex tableau (translates
//! `org/apache/commons/math/optimization/linear/SimplexTableau.java`).
//!
//! Column layout: the phase-1 objective column W (only while artificial
//! variables exist), the objective column Z, the decision variables (plus
//! one shared negative-half column when variables are unrestricted), the
//! slack variables, the artificial variables, and the right-hand side.
//! Row 0 is the objective row being pivoted on: W during phase 1, Z
//! afterwards.

use std::collections::HashSet;

use cm_core::Real;

use crate::comparison::close;
use crate::matrix::Matrix;
use crate::optimization::linear::{LinearConstraint, LinearObjectiveFunction, Relationship};
use crate::optimization::{GoalType, PointValue};

pub(crate) struct SimplexTableau {
    f: LinearObjectiveFunction,
    restrict_to_non_negative: bool,
    original_num_decision_variables: usize,
    num_decision_variables: usize,
    num_slack_variables: usize,
    num_artificial_variables: usize,
    num_objective_rows: usize,
    epsilon: Real,
    matrix: Matrix,
}

impl SimplexTableau {
    /// Build the initial tableau in canonical form: non-negative right-hand
    /// sides, a slack/surplus variable per inequality, and an artificial
    /// variable per `=` or `>=` row to supply the starting basis.
    pub(crate) fn new(
        f: &LinearObjectiveFunction,
        constraints: &[LinearConstraint],
        goal: GoalType,
        restrict_to_non_negative: bool,
        epsilon: Real,
    ) -> Self {
        let constraints: Vec<LinearConstraint> =
            constraints.iter().map(LinearConstraint::normalized).collect();

        let num_slack_variables = constraints
            .iter()
            .filter(|c| c.relationship() != Relationship::Eq)
            .count();
        let num_artificial_variables = constraints
            .iter()
            .filter(|c| c.relationship() != Relationship::Leq)
            .count();
        let num_objective_rows = if num_artificial_variables > 0 { 2 } else { 1 };

        let original_num_decision_variables = f.coefficients().size();
        let num_decision_variables =
            original_num_decision_variables + usize::from(!restrict_to_non_negative);

        let width = num_objective_rows
            + num_decision_variables
            + num_slack_variables
            + num_artificial_variables
            + 1;
        let height = num_objective_rows + constraints.len();
        let slack_offset = num_objective_rows + num_decision_variables;
        let artificial_offset = slack_offset + num_slack_variables;
        let rhs = width - 1;

        let maximize = goal == GoalType::Maximize;
        let mut matrix = Matrix::zeros(height, width);

        // objective rows
        if num_objective_rows == 2 {
            matrix[(0, 0)] = -1.0;
        }
        let z = num_objective_rows - 1;
        matrix[(z, z)] = if maximize { 1.0 } else { -1.0 };
        let objective: Vec<Real> = f
            .coefficients()
            .as_slice()
            .iter()
            .map(|&c| if maximize { -c } else { c })
            .collect();
        for (j, &c) in objective.iter().enumerate() {
            matrix[(z, num_objective_rows + j)] = c;
        }
        if !restrict_to_non_negative {
            matrix[(z, slack_offset - 1)] = -objective.iter().sum::<Real>();
        }
        matrix[(z, rhs)] = if maximize {
            f.constant_term()
        } else {
            -f.constant_term()
        };

        // constraint rows
        let mut slack_var = 0;
        let mut artificial_var = 0;
        for (i, constraint) in constraints.iter().enumerate() {
            let row = num_objective_rows + i;
            for (j, &c) in constraint.coefficients().as_slice().iter().enumerate() {
                matrix[(row, num_objective_rows + j)] = c;
            }
            if !restrict_to_non_negative {
                matrix[(row, slack_offset - 1)] = -constraint.coefficients().sum();
            }
            matrix[(row, rhs)] = constraint.value();

            match constraint.relationship() {
                Relationship::Leq => {
                    matrix[(row, slack_offset + slack_var)] = 1.0;
                    slack_var += 1;
                }
                Relationship::Geq => {
                    matrix[(row, slack_offset + slack_var)] = -1.0;
                    slack_var += 1;
                }
                Relationship::Eq => {}
            }
            if constraint.relationship() != Relationship::Leq {
                // new basic artificial variable: cancel its cost out of the
                // phase-1 objective row so the basis starts consistent
                matrix[(row, artificial_offset + artificial_var)] = 1.0;
                matrix[(0, artificial_offset + artificial_var)] = 1.0;
                artificial_var += 1;
                matrix.subtract_scaled_row(0, row, 1.0);
            }
        }

        Self {
            f: f.clone(),
            restrict_to_non_negative,
            original_num_decision_variables,
            num_decision_variables,
            num_slack_variables,
            num_artificial_variables,
            num_objective_rows,
            epsilon,
            matrix,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.matrix.cols()
    }

    pub(crate) fn height(&self) -> usize {
        self.matrix.rows()
    }

    pub(crate) fn entry(&self, row: usize, col: usize) -> Real {
        self.matrix[(row, col)]
    }

    pub(crate) fn num_objective_rows(&self) -> usize {
        self.num_objective_rows
    }

    pub(crate) fn num_artificial_variables(&self) -> usize {
        self.num_artificial_variables
    }

    pub(crate) fn rhs_offset(&self) -> usize {
        self.width() - 1
    }

    fn slack_offset(&self) -> usize {
        self.num_objective_rows + self.num_decision_variables
    }

    /// Perform the pivot: normalize the pivot row and eliminate the pivot
    /// column from every other row, preserving the one-basic-variable-per-
    /// row invariant.
    pub(crate) fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        let pivot_value = self.matrix[(pivot_row, pivot_col)];
        self.matrix.divide_row(pivot_row, pivot_value);
        for i in 0..self.height() {
            if i != pivot_row {
                let multiplier = self.matrix[(i, pivot_col)];
                if multiplier != 0.0 {
                    self.matrix.subtract_scaled_row(i, pivot_row, multiplier);
                }
            }
        }
    }

    /// `true` when the objective row (row 0) has no improving column left.
    pub(crate) fn is_optimal(&self) -> bool {
        for j in self.num_objective_rows..self.width() - 1 {
            if crate::comparison::compare_to(self.entry(0, j), 0.0, self.epsilon)
                == std::cmp::Ordering::Less
            {
                return false;
            }
        }
        true
    }

    /// Drop the phase-1 row and column and the artificial columns once
    /// phase 1 has driven the artificial variables out of the basis.
    pub(crate) fn discard_artificial_variables(&mut self) {
        if self.num_artificial_variables == 0 {
            return;
        }
        let new_width = self.width() - self.num_artificial_variables - 1;
        let new_height = self.height() - 1;
        let mut matrix = Matrix::zeros(new_height, new_width);
        for i in 0..new_height {
            for j in 0..new_width - 1 {
                matrix[(i, j)] = self.matrix[(i + 1, j + 1)];
            }
            matrix[(i, new_width - 1)] = self.matrix[(i + 1, self.rhs_offset())];
        }
        self.matrix = matrix;
        self.num_artificial_variables = 0;
        self.num_objective_rows = 1;
    }

    /// The row in which `col` is basic: a single entry of one, all other
    /// entries zero (within epsilon).
    fn basic_row(&self, col: usize) -> Option<usize> {
        let mut row = None;
        for i in 0..self.height() {
            let entry = self.entry(i, col);
            if close(entry, 1.0, self.epsilon) && row.is_none() {
                row = Some(i);
            } else if !close(entry, 0.0, self.epsilon) {
                return None;
            }
        }
        row
    }

    /// Read the optimum out of the final tableau.
    ///
    /// Destroys no state but is only meaningful once
    /// [`is_optimal`](SimplexTableau::is_optimal) holds.
    pub(crate) fn solution(&self) -> PointValue {
        let most_negative = if self.restrict_to_non_negative {
            0.0
        } else {
            // shared negative-half column: its basic value shifts every
            // unrestricted variable down
            self.basic_row(self.slack_offset() - 1)
                .map_or(0.0, |row| self.entry(row, self.rhs_offset()))
        };

        let mut basic_rows: HashSet<usize> = HashSet::new();
        let mut coefficients = vec![0.0; self.original_num_decision_variables];
        for (i, coefficient) in coefficients.iter_mut().enumerate() {
            *coefficient = match self.basic_row(self.num_objective_rows + i) {
                // a row may define only one basic variable; later claimants
                // of the same row are degenerate non-basic variables
                Some(row) if basic_rows.insert(row) => {
                    self.entry(row, self.rhs_offset()) - most_negative
                }
                _ => -most_negative,
            };
        }
        PointValue::new(coefficients.clone(), self.f.value(&coefficients))
    }
}
