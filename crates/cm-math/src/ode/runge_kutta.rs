//! Fixed-step Runge-Kutta integration (translates
//! `org/apache/commons/math/ode/nonstiff/RungeKuttaIntegrator.java` and its
//! classical fourth-order subclass).
//!
//! The stepper is generic over its Butcher tableau; a method is just a set
//! of shared, read-only coefficient arrays.

use cm_core::{errors::Result, Real};

use crate::ode::events::{EventHandler, EventState};
use crate::ode::interpolator::StepInterpolator;
use crate::ode::{
    process_accepted_step, FirstOrderSystem, OdeSolution, RunContext, StepHandler,
};

/// Default derivative-evaluation budget of the integrators.
pub const DEFAULT_MAX_EVALUATIONS: usize = 1_000_000;

/// Butcher tableau of an explicit Runge-Kutta method.
///
/// `c` holds the time fractions of stages `1..s` (stage 0 is at the step
/// start), `a` the strictly-lower-triangular stage weights (row `i` feeds
/// stage `i + 1`), and `b` the solution weights.  Tableaus are immutable
/// and shared read-only across all integrations of a method.
#[derive(Debug, Clone, Copy)]
pub struct ButcherTableau {
    /// Stage time fractions.
    pub c: &'static [Real],
    /// Stage weights, one row per stage after the first.
    pub a: &'static [&'static [Real]],
    /// Solution weights.
    pub b: &'static [Real],
}

/// The classical fourth-order tableau.
pub const CLASSICAL_RK4: ButcherTableau = ButcherTableau {
    c: &[1.0 / 2.0, 1.0 / 2.0, 1.0],
    a: &[&[1.0 / 2.0], &[0.0, 1.0 / 2.0], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
};

/// Compute all stage derivatives of one proposed step.
///
/// `y_dot0` is the already-computed derivative at the step start (stage 0);
/// it becomes `k[0]` without a fresh evaluation.
pub(crate) fn compute_stages<S: FirstOrderSystem + ?Sized>(
    ctx: &mut RunContext<'_, S>,
    tableau: &ButcherTableau,
    t: Real,
    y: &[Real],
    h: Real,
    y_dot0: &[Real],
) -> Result<Vec<Vec<Real>>> {
    let dim = y.len();
    let stages = tableau.b.len();
    let mut k: Vec<Vec<Real>> = Vec::with_capacity(stages);
    k.push(y_dot0.to_vec());

    let mut y_stage = vec![0.0; dim];
    for s in 1..stages {
        let a_row = tableau.a[s - 1];
        for i in 0..dim {
            let mut sum = 0.0;
            for (j, &a_sj) in a_row.iter().enumerate() {
                if a_sj != 0.0 {
                    sum += a_sj * k[j][i];
                }
            }
            y_stage[i] = y[i] + h * sum;
        }
        let mut k_s = vec![0.0; dim];
        ctx.derivatives(t + tableau.c[s - 1] * h, &y_stage, &mut k_s)?;
        k.push(k_s);
    }
    Ok(k)
}

/// Combine stage derivatives into the step-end state.
pub(crate) fn combine(y: &[Real], h: Real, b: &[Real], k: &[Vec<Real>]) -> Vec<Real> {
    (0..y.len())
        .map(|i| {
            let mut sum = 0.0;
            for (j, b_j) in b.iter().enumerate() {
                if *b_j != 0.0 {
                    sum += b_j * k[j][i];
                }
            }
            y[i] + h * sum
        })
        .collect()
}

/// Classical fourth-order Runge-Kutta integrator with a fixed step size.
///
/// There is no error estimation; accuracy is governed entirely by the step
/// size.  Event detection and step handlers work exactly as in the
/// adaptive integrator: a step carrying an event is truncated to the event
/// time and integration resumes from there on the fixed grid spacing.
pub struct ClassicalRungeKutta {
    step: Real,
    max_evaluations: usize,
    event_states: Vec<EventState>,
    step_handlers: Vec<Box<dyn StepHandler>>,
}

impl ClassicalRungeKutta {
    /// Create an integrator with the given (positive) step size.
    pub fn new(step: Real) -> Self {
        Self {
            step: step.abs(),
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            event_states: Vec::new(),
            step_handlers: Vec::new(),
        }
    }

    /// Set the derivative-evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Register an event handler.
    ///
    /// `max_check_interval` bounds the switching-function sampling interval
    /// inside a step, `convergence` the accuracy of event-time
    /// localization, and `max_iteration_count` the localization budget.
    pub fn add_event_handler(
        &mut self,
        handler: Box<dyn EventHandler>,
        max_check_interval: Real,
        convergence: Real,
        max_iteration_count: usize,
    ) {
        self.event_states.push(EventState::new(
            handler,
            max_check_interval,
            convergence,
            max_iteration_count,
        ));
    }

    /// Register a step handler.
    pub fn add_step_handler(&mut self, handler: Box<dyn StepHandler>) {
        self.step_handlers.push(handler);
    }

    /// Integrate `system` from `(t0, y0)` to `t_end`.
    ///
    /// # Errors
    /// [`Error::Precondition`](cm_core::Error::Precondition) for a
    /// dimension mismatch, an empty interval, or a non-positive step size;
    /// [`Error::TooManyEvaluations`](cm_core::Error::TooManyEvaluations)
    /// when the evaluation budget runs out.
    pub fn integrate<S: FirstOrderSystem>(
        &mut self,
        system: &S,
        t0: Real,
        y0: &[Real],
        t_end: Real,
    ) -> Result<OdeSolution> {
        cm_core::ensure!(
            system.dimension() == y0.len(),
            "dimension mismatch: system declares {}, initial state has {}",
            system.dimension(),
            y0.len()
        );
        cm_core::ensure!(t_end != t0, "integration interval is empty at t = {t0}");
        cm_core::ensure!(self.step > 0.0, "step size must be positive");

        let forward = t_end > t0;
        let dir = if forward { 1.0 } else { -1.0 };
        let mut ctx = RunContext::new(system, self.max_evaluations);

        let mut t = t0;
        let mut y = y0.to_vec();
        let dim = y.len();
        let mut y_dot = vec![0.0; dim];
        ctx.derivatives(t, &y, &mut y_dot)?;

        for state in &mut self.event_states {
            state.reinitialize_begin(t, &y, forward);
        }

        let mut accepted_steps = 0;
        loop {
            let mut h = self.step * dir;
            let mut last = false;
            if dir * (t + h - t_end) >= 0.0 {
                h = t_end - t;
                last = true;
            }

            let k = compute_stages(&mut ctx, &CLASSICAL_RK4, t, &y, h, &y_dot)?;
            let y1 = combine(&y, h, CLASSICAL_RK4.b, &k);
            let mut y_dot1 = vec![0.0; dim];
            ctx.derivatives(t + h, &y1, &mut y_dot1)?;

            let interpolator =
                StepInterpolator::new(t, y.clone(), y_dot.clone(), t + h, y1, y_dot1);
            let outcome = process_accepted_step(&mut ctx, &mut self.event_states, interpolator)?;
            accepted_steps += 1;

            let is_last = outcome.stop || (last && !outcome.truncated);
            for handler in &mut self.step_handlers {
                handler.handle_step(&outcome.interpolator, is_last);
            }

            t = outcome.t;
            y = outcome.y;
            y_dot = outcome.y_dot;

            if is_last {
                return Ok(OdeSolution {
                    time: t,
                    state: y,
                    evaluations: ctx.evaluations(),
                    accepted_steps,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::SystemFn;
    use approx::assert_abs_diff_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn exponential_growth() {
        // y' = y, y(0) = 1: y(1) = e
        let system = SystemFn::new(1, |_t, y: &[Real], y_dot: &mut [Real]| y_dot[0] = y[0]);
        let mut integrator = ClassicalRungeKutta::new(1e-3);
        let solution = integrator.integrate(&system, 0.0, &[1.0], 1.0).unwrap();
        assert_abs_diff_eq!(solution.state[0], std::f64::consts::E, epsilon = 1e-10);
        assert_eq!(solution.time, 1.0);
    }

    #[test]
    fn sine_cosine_system() {
        // y1' = y2, y2' = -y1 from (0, 1): (sin t, cos t)
        let system = SystemFn::new(2, |_t, y: &[Real], y_dot: &mut [Real]| {
            y_dot[0] = y[1];
            y_dot[1] = -y[0];
        });
        let mut integrator = ClassicalRungeKutta::new(1e-3);
        let t_end = std::f64::consts::PI;
        let solution = integrator.integrate(&system, 0.0, &[0.0, 1.0], t_end).unwrap();
        assert_abs_diff_eq!(solution.state[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.state[1], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let system = SystemFn::new(2, |_t, _y: &[Real], _y_dot: &mut [Real]| {});
        let mut integrator = ClassicalRungeKutta::new(0.1);
        assert!(integrator.integrate(&system, 0.0, &[1.0], 1.0).is_err());
    }

    #[test]
    fn step_handler_sees_every_step() {
        struct Recorder(Rc<RefCell<Vec<(Real, bool)>>>);
        impl StepHandler for Recorder {
            fn handle_step(&mut self, interpolator: &StepInterpolator, is_last: bool) {
                self.0
                    .borrow_mut()
                    .push((interpolator.current_time(), is_last));
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let system = SystemFn::new(1, |_t, _y: &[Real], y_dot: &mut [Real]| y_dot[0] = 1.0);
        let mut integrator = ClassicalRungeKutta::new(0.25);
        integrator.add_step_handler(Box::new(Recorder(Rc::clone(&log))));
        integrator.integrate(&system, 0.0, &[0.0], 1.0).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert!(log[..3].iter().all(|&(_, is_last)| !is_last));
        let (t_last, is_last) = log[3];
        assert_abs_diff_eq!(t_last, 1.0, epsilon = 1e-12);
        assert!(is_last);
    }

    #[test]
    fn backward_integration() {
        let system = SystemFn::new(1, |_t, y: &[Real], y_dot: &mut [Real]| y_dot[0] = y[0]);
        let mut integrator = ClassicalRungeKutta::new(1e-3);
        let solution = integrator
            .integrate(&system, 1.0, &[std::f64::consts::E], 0.0)
            .unwrap();
        assert_abs_diff_eq!(solution.state[0], 1.0, epsilon = 1e-10);
    }
}
