//! ODE event detection (translates
//! `org/apache/commons/math/ode/events/EventState.java`).
//!
//! An event is a zero crossing of a scalar switching function `g(t, y)`
//! during a step.  Each registered handler owns one [`EventState`], which
//! scans every proposed step for sign changes, localizes the crossing with
//! a forced-side root solve, suppresses re-detection of an event that was
//! already handled, and records the handler's requested action once the
//! step is committed.

use cm_core::{errors::Result, Real};

use crate::ode::interpolator::StepInterpolator;
use crate::solvers1d::{AllowedSolution, BisectionSolver};

/// Action requested by an event handler once its event has occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Continue integration unchanged.
    Continue,
    /// Terminate the run at the event time.
    Stop,
    /// The handler has rewritten the state vector; derivatives must be
    /// recomputed before the next step.
    ResetState,
    /// The state is unchanged but derivatives must be recomputed (e.g. the
    /// handler switched an external regime the derivative closure reads).
    ResetDerivatives,
}

/// An event handler: the switching function plus the occurrence callbacks.
pub trait EventHandler {
    /// The switching function.  Its sign changes exactly at events.
    fn g(&mut self, t: Real, y: &[Real]) -> Real;

    /// Called once when an event has been localized and the step carrying
    /// it is committed.  `increasing` is the crossing direction in physical
    /// time: `true` when `g` goes from negative to positive.
    fn event_occurred(&mut self, t: Real, y: &[Real], increasing: bool) -> EventAction;

    /// Rewrite the state at the event when [`EventAction::ResetState`] was
    /// returned.  The default leaves the state unchanged.
    fn reset_state(&mut self, _t: Real, _y: &mut [Real]) {}
}

/// Per-handler event-detection state machine.
///
/// Lifecycle: created when the handler is registered,
/// [`reinitialize_begin`](EventState::reinitialize_begin) at run start,
/// then once per accepted step
/// [`evaluate_step`](EventState::evaluate_step) →
/// [`step_accepted`](EventState::step_accepted) →
/// [`reset`](EventState::reset).
/// `pending_event_time` is defined exactly when a pending event exists.
pub struct EventState {
    handler: Box<dyn EventHandler>,

    /// Maximal time between two switching-function checks inside a step.
    max_check_interval: Real,
    /// Convergence width for event-time localization.
    convergence: Real,
    /// Evaluation budget of the localization solver.
    max_iteration_count: usize,

    t0: Real,
    g0: Real,
    g0_positive: bool,
    pending_event: bool,
    pending_event_time: Real,
    previous_event_time: Real,
    increasing: bool,
    forward: bool,
    next_action: EventAction,
}

impl EventState {
    /// Wrap a handler in a fresh detection state.
    pub fn new(
        handler: Box<dyn EventHandler>,
        max_check_interval: Real,
        convergence: Real,
        max_iteration_count: usize,
    ) -> Self {
        Self {
            handler,
            max_check_interval,
            convergence: convergence.abs(),
            max_iteration_count,
            t0: Real::NAN,
            g0: Real::NAN,
            g0_positive: true,
            pending_event: false,
            pending_event_time: Real::NAN,
            previous_event_time: Real::NAN,
            increasing: true,
            forward: true,
            next_action: EventAction::Continue,
        }
    }

    /// Convergence width for event-time localization.
    pub fn convergence(&self) -> Real {
        self.convergence
    }

    /// Time of the pending event, if one was detected on the last
    /// [`evaluate_step`](EventState::evaluate_step).
    pub fn pending_event_time(&self) -> Option<Real> {
        if self.pending_event {
            Some(self.pending_event_time)
        } else {
            None
        }
    }

    /// Reinitialize at the start of a run (or after a discontinuous reset).
    ///
    /// If `g` is exactly zero at `t0` — typically because the run resumes
    /// right on a previous event — the sign is sampled half a convergence
    /// width into the run instead, so the old event is not immediately
    /// re-triggered.
    pub fn reinitialize_begin(&mut self, t0: Real, y0: &[Real], forward: bool) {
        self.forward = forward;
        self.t0 = t0;
        let mut g0 = self.handler.g(t0, y0);
        if g0 == 0.0 {
            let t_start = t0 + 0.5 * self.convergence * if forward { 1.0 } else { -1.0 };
            g0 = self.handler.g(t_start, y0);
        }
        self.g0 = g0;
        self.g0_positive = g0 >= 0.0;
        self.pending_event = false;
        self.pending_event_time = Real::NAN;
        self.previous_event_time = Real::NAN;
        self.next_action = EventAction::Continue;
    }

    /// Scan a proposed step for a sign change of the switching function.
    ///
    /// The step is subdivided so that consecutive checks are at most
    /// `max_check_interval` apart.  On the first sign flip the crossing is
    /// localized inside the flipping substep, forced to the side of the
    /// root consistent with the integration direction.  A root within
    /// `convergence` of the previously handled event is skipped: the
    /// substep start is nudged past it and the substep rescanned.
    ///
    /// Returns `true` when a new pending event was recorded; remaining
    /// substeps are not scanned in that case.
    pub fn evaluate_step(&mut self, interpolator: &StepInterpolator) -> Result<bool> {
        let t1 = interpolator.current_time();
        self.forward = interpolator.is_forward();

        let span = t1 - self.t0;
        let n = ((span.abs() / self.max_check_interval).ceil()).max(1.0) as usize;
        let h = span / n as Real;

        let mut ta = self.t0;
        let mut ga = self.g0;
        let mut i = 0;
        while i < n {
            let tb = if i == n - 1 {
                t1
            } else {
                self.t0 + (i as Real + 1.0) * h
            };
            let yb = interpolator.interpolate(tb);
            let gb = self.handler.g(tb, &yb);

            if self.g0_positive != (gb >= 0.0) {
                // sign change: the event lies between ta and tb
                self.increasing = gb >= ga;

                let side = if self.forward {
                    AllowedSolution::RightSide
                } else {
                    AllowedSolution::LeftSide
                };
                let solver = BisectionSolver::new(self.convergence)
                    .with_max_evaluations(self.max_iteration_count);
                let handler = &mut self.handler;
                let gfn = |t: Real| handler.g(t, &interpolator.interpolate(t));
                let (lo, hi) = if ta <= tb { (ta, tb) } else { (tb, ta) };
                let root = solver.solve_allowed(gfn, lo, hi, side)?;

                if self.previous_event_time.is_nan()
                    || (root - self.previous_event_time).abs() > self.convergence
                {
                    self.pending_event = true;
                    self.pending_event_time = root;
                    return Ok(true);
                }

                // this root was already handled on an earlier step: move
                // the substep start just past it and rescan what is left
                ta = root + self.convergence * if self.forward { 1.0 } else { -1.0 };
                if (self.forward && ta >= tb) || (!self.forward && ta <= tb) {
                    ta = tb;
                    ga = gb;
                    i += 1;
                } else {
                    let ya = interpolator.interpolate(ta);
                    ga = self.handler.g(ta, &ya);
                }
            } else {
                ta = tb;
                ga = gb;
                i += 1;
            }
        }

        self.pending_event = false;
        self.pending_event_time = Real::NAN;
        Ok(false)
    }

    /// Acknowledge the commit of a step ending at `(t, y)`.
    ///
    /// When the commit point matches the pending event time within
    /// `convergence`, the handler's occurrence callback fires and its
    /// requested action is recorded; otherwise the state merely
    /// resynchronizes `g0` from the new step start.
    pub fn step_accepted(&mut self, t: Real, y: &[Real]) {
        self.t0 = t;
        self.g0 = self.handler.g(t, y);

        if self.pending_event && (self.pending_event_time - t).abs() <= self.convergence {
            self.previous_event_time = t;
            // just past the crossing, the sign of g is the crossing
            // direction, whatever the root solver left in g0
            self.g0_positive = self.increasing;
            self.next_action =
                self.handler
                    .event_occurred(t, y, self.increasing == self.forward);
        } else {
            // a pending event beyond the commit point is stale (the step
            // was truncated by another handler); it will be re-detected
            self.pending_event = false;
            self.pending_event_time = Real::NAN;
            self.g0_positive = self.g0 >= 0.0;
            self.next_action = EventAction::Continue;
        }
    }

    /// `true` when the last committed event asked the run to stop.
    pub fn stop_requested(&self) -> bool {
        self.next_action == EventAction::Stop
    }

    /// Consume the pending event at commit time `t`, applying a state
    /// rewrite when one was requested.
    ///
    /// Returns `true` when the integrator must recompute derivatives
    /// before the next step (state rewritten or derivatives invalidated).
    pub fn reset(&mut self, t: Real, y: &mut [Real]) -> bool {
        if !(self.pending_event && (self.pending_event_time - t).abs() <= self.convergence) {
            return false;
        }
        if self.next_action == EventAction::ResetState {
            self.handler.reset_state(t, y);
        }
        self.pending_event = false;
        self.pending_event_time = Real::NAN;
        self.next_action == EventAction::ResetState
            || self.next_action == EventAction::ResetDerivatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Handler with g(t, y) = y[0] - threshold, recording occurrences in a
    /// shared log so tests can inspect them.
    struct Threshold {
        threshold: Real,
        action: EventAction,
        occurrences: Rc<RefCell<Vec<(Real, bool)>>>,
    }

    impl Threshold {
        fn new(threshold: Real, action: EventAction) -> (Self, Rc<RefCell<Vec<(Real, bool)>>>) {
            let occurrences = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    threshold,
                    action,
                    occurrences: Rc::clone(&occurrences),
                },
                occurrences,
            )
        }
    }

    impl EventHandler for Threshold {
        fn g(&mut self, _t: Real, y: &[Real]) -> Real {
            y[0] - self.threshold
        }

        fn event_occurred(&mut self, t: Real, _y: &[Real], increasing: bool) -> EventAction {
            self.occurrences.borrow_mut().push((t, increasing));
            self.action
        }
    }

    /// Interpolator for y(t) = t on [t0, t1] (y' = 1).
    fn linear_step(t0: Real, t1: Real) -> StepInterpolator {
        StepInterpolator::new(t0, vec![t0], vec![1.0], t1, vec![t1], vec![1.0])
    }

    #[test]
    fn detects_crossing_in_step() {
        let (handler, occurrences) = Threshold::new(5.0, EventAction::Stop);
        let mut state = EventState::new(Box::new(handler), 1.0, 1e-9, 1000);
        state.reinitialize_begin(0.0, &[0.0], true);

        // no crossing before the threshold
        assert!(!state.evaluate_step(&linear_step(0.0, 4.0)).unwrap());
        state.step_accepted(4.0, &[4.0]);

        // crossing inside [4, 6]
        assert!(state.evaluate_step(&linear_step(4.0, 6.0)).unwrap());
        let te = state.pending_event_time().unwrap();
        assert!((te - 5.0).abs() <= 1e-8, "event located at {te}");
        // forward integration: the reported root is at or after the crossing
        assert!(te >= 5.0 - 1e-12);

        state.step_accepted(te, &[te]);
        assert!(state.stop_requested());
        let log = occurrences.borrow();
        assert_eq!(log.len(), 1);
        assert!(log[0].1, "g crosses upward, direction must be increasing");
    }

    #[test]
    fn suppresses_already_handled_event() {
        let (handler, occurrences) = Threshold::new(5.0, EventAction::Continue);
        let mut state = EventState::new(Box::new(handler), 10.0, 1e-9, 1000);
        state.reinitialize_begin(0.0, &[0.0], true);

        assert!(state.evaluate_step(&linear_step(0.0, 10.0)).unwrap());
        let te = state.pending_event_time().unwrap();
        state.step_accepted(te, &[te]);
        state.reset(te, &mut [te]);

        // resuming from the event: the same crossing must not re-trigger
        assert!(!state.evaluate_step(&linear_step(te, 10.0)).unwrap());
        assert_eq!(occurrences.borrow().len(), 1);
    }

    #[test]
    fn zero_at_start_is_perturbed() {
        let (handler, _) = Threshold::new(0.0, EventAction::Continue);
        let mut state = EventState::new(Box::new(handler), 10.0, 1e-9, 1000);
        // g(t0) = 0 exactly; the perturbed sample decides the sign
        state.reinitialize_begin(0.0, &[0.0], true);
        // y(t) = t stays positive afterwards: no sign change, no event
        assert!(!state.evaluate_step(&linear_step(0.0, 3.0)).unwrap());
    }

    #[test]
    fn reports_crossing_direction() {
        // decreasing crossing: y(t) = 2 - t against threshold 1 at t = 1
        let (handler, occurrences) = Threshold::new(1.0, EventAction::Continue);
        let mut state = EventState::new(Box::new(handler), 10.0, 1e-10, 1000);
        let step = StepInterpolator::new(0.0, vec![2.0], vec![-1.0], 2.0, vec![0.0], vec![-1.0]);
        state.reinitialize_begin(0.0, &[2.0], true);
        assert!(state.evaluate_step(&step).unwrap());
        let te = state.pending_event_time().unwrap();
        assert!((te - 1.0).abs() < 1e-9, "event located at {te}");
        state.step_accepted(te, &[2.0 - te]);

        assert!(!state.stop_requested());
        let log = occurrences.borrow();
        assert_eq!(log.len(), 1);
        assert!(!log[0].1, "g crosses downward, direction must be decreasing");
    }

    #[test]
    fn stale_pending_event_is_cleared() {
        let (handler, occurrences) = Threshold::new(5.0, EventAction::Stop);
        let mut state = EventState::new(Box::new(handler), 10.0, 1e-9, 1000);
        state.reinitialize_begin(0.0, &[0.0], true);
        assert!(state.evaluate_step(&linear_step(0.0, 10.0)).unwrap());

        // another handler truncated the step to t = 2, before this event
        state.step_accepted(2.0, &[2.0]);
        assert!(!state.stop_requested());
        assert!(state.pending_event_time().is_none());
        assert!(occurrences.borrow().is_empty());
    }
}
