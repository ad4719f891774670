//! Dense output within an accepted step (translates
//! `org/apache/commons/math/ode/sampling/StepInterpolator.java`).

use cm_core::Real;

/// Immutable snapshot of an accepted integration step, able to reproduce
/// the solution at any time within the step by cubic Hermite interpolation
/// on the endpoint states and derivatives.
///
/// A new interpolator replaces the previous one wholesale on every accepted
/// step; the integrator lends it by reference to event detectors and step
/// handlers.
#[derive(Debug, Clone)]
pub struct StepInterpolator {
    t0: Real,
    t1: Real,
    y0: Vec<Real>,
    y1: Vec<Real>,
    y_dot0: Vec<Real>,
    y_dot1: Vec<Real>,
}

impl StepInterpolator {
    pub(crate) fn new(
        t0: Real,
        y0: Vec<Real>,
        y_dot0: Vec<Real>,
        t1: Real,
        y1: Vec<Real>,
        y_dot1: Vec<Real>,
    ) -> Self {
        Self {
            t0,
            t1,
            y0,
            y1,
            y_dot0,
            y_dot1,
        }
    }

    /// Time at the start of the step.
    pub fn previous_time(&self) -> Real {
        self.t0
    }

    /// Time at the end of the step.
    pub fn current_time(&self) -> Real {
        self.t1
    }

    /// State at the start of the step.
    pub fn previous_state(&self) -> &[Real] {
        &self.y0
    }

    /// State at the end of the step.
    pub fn current_state(&self) -> &[Real] {
        &self.y1
    }

    /// Derivatives at the start of the step.
    pub fn previous_derivative(&self) -> &[Real] {
        &self.y_dot0
    }

    /// Derivatives at the end of the step.
    pub fn current_derivative(&self) -> &[Real] {
        &self.y_dot1
    }

    /// `true` if the step advances time (forward integration).
    pub fn is_forward(&self) -> bool {
        self.t1 >= self.t0
    }

    /// `true` if `t` lies within the closed step interval, in either
    /// integration direction.
    pub fn contains(&self, t: Real) -> bool {
        if self.is_forward() {
            (self.t0..=self.t1).contains(&t)
        } else {
            (self.t1..=self.t0).contains(&t)
        }
    }

    /// Interpolated state at time `t`.
    ///
    /// Cubic Hermite interpolation on `(y0, y_dot0)` and `(y1, y_dot1)`:
    /// exact for polynomial solutions up to degree three, and of order
    /// `O(h^4)` inside a step of size `h` otherwise.  Valid for `t` within
    /// the step; callers outside the step get the polynomial's
    /// extrapolation.
    pub fn interpolate(&self, t: Real) -> Vec<Real> {
        let h = self.t1 - self.t0;
        if h == 0.0 {
            return self.y1.clone();
        }
        let theta = (t - self.t0) / h;
        let theta2 = theta * theta;
        let theta3 = theta2 * theta;

        // Hermite basis
        let h00 = 2.0 * theta3 - 3.0 * theta2 + 1.0;
        let h10 = theta3 - 2.0 * theta2 + theta;
        let h01 = -2.0 * theta3 + 3.0 * theta2;
        let h11 = theta3 - theta2;

        (0..self.y0.len())
            .map(|i| {
                h00 * self.y0[i]
                    + h10 * h * self.y_dot0[i]
                    + h01 * self.y1[i]
                    + h11 * h * self.y_dot1[i]
            })
            .collect()
    }
}
