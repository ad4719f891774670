//! Ordinary differential equation integration (translates
//! `org/apache/commons/math/ode/`).
//!
//! The integrators advance a first-order system `y' = f(t, y)` from an
//! initial state to a target time, producing a dense-output
//! [`StepInterpolator`](interpolator::StepInterpolator) for every accepted
//! step and consulting the registered
//! [`EventState`](events::EventState) machines before committing to it.
//! A step on which an event fires is truncated to the event time; the
//! original full-length step is discarded.

pub mod dormand_prince853;
pub mod events;
pub mod interpolator;
pub mod runge_kutta;

use cm_core::{
    errors::{Error, Result},
    Real,
};

use events::EventState;
use interpolator::StepInterpolator;

/// A system of first-order ordinary differential equations `y' = f(t, y)`.
///
/// The derivative computation must be a pure function of `(t, y)`; the
/// integrators assume repeated evaluation at the same point yields the same
/// value.
pub trait FirstOrderSystem {
    /// Dimension of the state vector.
    fn dimension(&self) -> usize;

    /// Compute the derivatives `y_dot = f(t, y)`.
    fn derivatives(&self, t: Real, y: &[Real], y_dot: &mut [Real]) -> Result<()>;
}

/// Wrap a closure together with its dimension as a [`FirstOrderSystem`].
pub struct SystemFn<F> {
    dimension: usize,
    f: F,
}

impl<F> SystemFn<F>
where
    F: Fn(Real, &[Real], &mut [Real]),
{
    /// Create a system of the given dimension from a derivative closure.
    pub fn new(dimension: usize, f: F) -> Self {
        Self { dimension, f }
    }
}

impl<F> FirstOrderSystem for SystemFn<F>
where
    F: Fn(Real, &[Real], &mut [Real]),
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn derivatives(&self, t: Real, y: &[Real], y_dot: &mut [Real]) -> Result<()> {
        (self.f)(t, y, y_dot);
        Ok(())
    }
}

/// Observer of accepted integration steps.
///
/// Handlers receive every accepted (possibly event-truncated) step and may
/// sample it anywhere within its bounds through the interpolator.
pub trait StepHandler {
    /// Called once per accepted step; `is_last` marks the final step of the
    /// run, whether the target time was reached or a handler stopped it.
    fn handle_step(&mut self, interpolator: &StepInterpolator, is_last: bool);
}

/// Final state of an integration run.
#[derive(Debug, Clone)]
pub struct OdeSolution {
    /// Time actually reached: the target time, or the event time when a
    /// handler stopped the run early.
    pub time: Real,
    /// State vector at [`OdeSolution::time`].
    pub state: Vec<Real>,
    /// Number of derivative evaluations spent.
    pub evaluations: usize,
    /// Number of accepted steps.
    pub accepted_steps: usize,
}

/// Per-run bookkeeping: the derivative provider plus the evaluation budget.
///
/// Every stage evaluation of every integrator routes through
/// [`RunContext::derivatives`], so the budget is enforced uniformly and the
/// count reported in [`OdeSolution`] is exact.
pub(crate) struct RunContext<'a, S: FirstOrderSystem + ?Sized> {
    system: &'a S,
    evaluations: usize,
    max_evaluations: usize,
}

impl<'a, S: FirstOrderSystem + ?Sized> RunContext<'a, S> {
    pub(crate) fn new(system: &'a S, max_evaluations: usize) -> Self {
        Self {
            system,
            evaluations: 0,
            max_evaluations,
        }
    }

    pub(crate) fn derivatives(&mut self, t: Real, y: &[Real], y_dot: &mut [Real]) -> Result<()> {
        if self.evaluations >= self.max_evaluations {
            return Err(Error::TooManyEvaluations {
                max: self.max_evaluations,
            });
        }
        self.evaluations += 1;
        self.system.derivatives(t, y, y_dot)
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// What became of a proposed step after event processing.
pub(crate) struct StepOutcome {
    pub t: Real,
    pub y: Vec<Real>,
    pub y_dot: Vec<Real>,
    pub interpolator: StepInterpolator,
    pub stop: bool,
    pub truncated: bool,
}

/// Present an error-accepted step to the event detectors and commit it.
///
/// If any detector reports a pending event, the step is truncated to the
/// earliest event time (direction-aware, ties keeping the first registered
/// handler), the handlers' occurrence callbacks run at the commit point,
/// and requested state/derivative resets are applied before returning.
pub(crate) fn process_accepted_step<S: FirstOrderSystem + ?Sized>(
    ctx: &mut RunContext<'_, S>,
    event_states: &mut [EventState],
    interpolator: StepInterpolator,
) -> Result<StepOutcome> {
    let forward = interpolator.is_forward();
    let t1 = interpolator.current_time();

    let mut event_time: Option<Real> = None;
    for state in event_states.iter_mut() {
        if state.evaluate_step(&interpolator)? {
            let te = state
                .pending_event_time()
                .expect("evaluate_step reported an event without a pending time");
            event_time = Some(match event_time {
                None => te,
                Some(current) if (forward && te < current) || (!forward && te > current) => te,
                Some(current) => current,
            });
        }
    }

    let (t_acc, mut y_acc, mut y_dot_acc, interp_acc, truncated) = match event_time {
        Some(te) if te != t1 => {
            let y_e = interpolator.interpolate(te);
            let mut y_dot_e = vec![0.0; y_e.len()];
            ctx.derivatives(te, &y_e, &mut y_dot_e)?;
            let interp = StepInterpolator::new(
                interpolator.previous_time(),
                interpolator.previous_state().to_vec(),
                interpolator.previous_derivative().to_vec(),
                te,
                y_e.clone(),
                y_dot_e.clone(),
            );
            (te, y_e, y_dot_e, interp, true)
        }
        _ => {
            let y = interpolator.current_state().to_vec();
            let y_dot = interpolator.current_derivative().to_vec();
            (t1, y, y_dot, interpolator, false)
        }
    };

    for state in event_states.iter_mut() {
        state.step_accepted(t_acc, &y_acc);
    }
    let stop = event_states.iter().any(EventState::stop_requested);

    let mut needs_new_derivatives = false;
    for state in event_states.iter_mut() {
        if state.reset(t_acc, &mut y_acc) {
            needs_new_derivatives = true;
        }
    }
    if needs_new_derivatives {
        ctx.derivatives(t_acc, &y_acc, &mut y_dot_acc)?;
        // the jump invalidated every detector's stored g0; re-priming from
        // the post-reset state keeps the next scan's brackets sign-correct
        for state in event_states.iter_mut() {
            state.reinitialize_begin(t_acc, &y_acc, forward);
        }
    }

    Ok(StepOutcome {
        t: t_acc,
        y: y_acc,
        y_dot: y_dot_acc,
        interpolator: interp_acc,
        stop,
        truncated,
    })
}
