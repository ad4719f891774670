//! Dormand-Prince 8(5,3) adaptive integrator (translates
//! `org/apache/commons/math/ode/nonstiff/DormandPrince853Integrator.java`).
//!
//! An embedded Runge-Kutta method of order 8 with a combined 5th/3rd-order
//! error estimator, using the coefficients of Hairer, Nørsett & Wanner.

#![allow(clippy::excessive_precision)]

use cm_core::{
    errors::{Error, Result},
    Real,
};

use crate::ode::events::{EventHandler, EventState};
use crate::ode::interpolator::StepInterpolator;
use crate::ode::runge_kutta::{combine, compute_stages, ButcherTableau, DEFAULT_MAX_EVALUATIONS};
use crate::ode::{
    process_accepted_step, FirstOrderSystem, OdeSolution, RunContext, StepHandler,
};

/// Default bound on step attempts (accepted + rejected) per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

// step-size controller
const SAFETY: Real = 0.9;
const MIN_REDUCTION: Real = 0.2;
const MAX_GROWTH: Real = 10.0;
const EXP: Real = -1.0 / 8.0;

// time fractions c2..c12
const C: [Real; 11] = [
    0.526001519587677318785587544488e-01,
    0.789002279381515978178381316732e-01,
    0.118350341907227396726757197510,
    0.281649658092772603273242802490,
    0.333333333333333333333333333333,
    0.25,
    0.307692307692307692307692307692,
    0.651282051282051282051282051282,
    0.6,
    0.857142857142857142857142857142,
    1.0,
];

// stage weights, row s feeding stage s + 1
const A: [&[Real]; 11] = [
    &[5.26001519587677318785587544488e-02],
    &[1.97250569845378994544595329183e-02, 5.91751709536136983633785987549e-02],
    &[2.95875854768068491816892993775e-02, 0.0, 8.87627564304205475450678981324e-02],
    &[
        2.41365134159266685502369798665e-01,
        0.0,
        -8.84549479328286085344864962717e-01,
        9.24834003261792003115737966543e-01,
    ],
    &[
        3.70370370370370370370370370370e-02,
        0.0,
        0.0,
        1.70828608729473871279604482173e-01,
        1.25467687566822425016691814123e-01,
    ],
    &[
        3.71093750000000000000000000000e-02,
        0.0,
        0.0,
        1.70252211019544039314978060272e-01,
        6.02165389804559606850219397283e-02,
        -1.75781250000000000000000000000e-02,
    ],
    &[
        3.70920001185047927108779319836e-02,
        0.0,
        0.0,
        1.70383925712239993810214054705e-01,
        1.07262030446373284651809199168e-01,
        -1.53194377486244017527936158236e-02,
        8.27378916381402288758473766002e-03,
    ],
    &[
        6.24110958716075717114429577812e-01,
        0.0,
        0.0,
        -3.36089262944694129406857109825e+00,
        -8.68219346841726006818189891453e-01,
        2.75920996994467083049415600797e+01,
        2.01540675504778934086186788979e+01,
        -4.34898841810699588477366255144e+01,
    ],
    &[
        4.77662536438264365890433908527e-01,
        0.0,
        0.0,
        -2.48811461997166764192642586468e+00,
        -5.90290826836842996371446475743e-01,
        2.12300514481811942347288949897e+01,
        1.52792336328824235832596922938e+01,
        -3.32882109689848629194453265587e+01,
        -2.03312017085086261358222928593e-02,
    ],
    &[
        -9.37142430085987325717040528057e-01,
        0.0,
        0.0,
        5.18637242884406370830023853209e+00,
        1.09143734899672957818500254654e+00,
        -8.14978701074692612513997267357e+00,
        -1.85200656599969598641566180701e+01,
        2.27394870993505042818970056734e+01,
        2.49360555267965238987089396762e+00,
        -3.01726999341168153929447817486e+00,
    ],
    &[
        2.27331014751653820792359768449e+00,
        0.0,
        0.0,
        -1.05344954667372501984066689879e+01,
        -2.00087205822486249909675718444e+00,
        -1.79589318631187989172765950534e+01,
        2.79488845294199600508499808837e+01,
        -2.85899827713502369474065508674e+00,
        -8.87285693353062954433549289258e+00,
        1.23605671757943030647266201528e+01,
        6.43392746015763530355970484046e-01,
    ],
];

// 8th-order solution weights
const B: [Real; 12] = [
    5.42937341165687622380535766363e-02,
    0.0,
    0.0,
    0.0,
    0.0,
    4.45031289275240888144113950566e+00,
    1.89151789931450038304281599044e+00,
    -5.80120396001058478146721142270e+00,
    3.11168072561590417690755489127e-01,
    -1.52160949662516078556178806805e-01,
    2.01365400804030348374776537501e-01,
    4.47106157277725905176885569043e-02,
];

// 5th-order error weights
const E1: [Real; 12] = [
    0.1312004499419488073250102996e-01,
    0.0,
    0.0,
    0.0,
    0.0,
    -0.1225156446376204440720569753e+01,
    -0.4957589496572501915214079952e+00,
    0.1664377182454986536961530415e+01,
    -0.3503288487499736816886487290e+00,
    0.3341791187130174790297318841e+00,
    0.8192320648511571246570742613e-01,
    -0.2235530786388629525884427845e-01,
];

// 3rd-order error weights: the solution weights minus the BHH combination
// at stages 1, 9, and 12
const E2: [Real; 12] = [
    -0.189800754072407615714702328876e+00,
    0.0,
    0.0,
    0.0,
    0.0,
    4.45031289275240888144113950566e+00,
    1.89151789931450038304281599044e+00,
    -5.80120396001058478146721142270e+00,
    -0.422678615720021439650606252420e+00,
    -1.52160949662516078556178806805e-01,
    2.01365400804030348374776537501e-01,
    0.226517921983608258118062039631e-01,
];

const TABLEAU: ButcherTableau = ButcherTableau {
    c: &C,
    a: &A,
    b: &B,
};

/// Adaptive Dormand-Prince 8(5,3) integrator.
///
/// Step sizes adapt between `min_step` and `max_step` so the weighted RMS
/// of the estimated local error stays below one, where the weights fold in
/// the absolute and relative tolerances.  Registered event handlers can
/// truncate steps and stop or reset the run.
pub struct DormandPrince853 {
    min_step: Real,
    max_step: Real,
    abs_tol: Real,
    rel_tol: Real,
    max_evaluations: usize,
    max_iterations: usize,
    event_states: Vec<EventState>,
    step_handlers: Vec<Box<dyn StepHandler>>,
}

impl DormandPrince853 {
    /// Create an integrator with step bounds and error tolerances.
    pub fn new(min_step: Real, max_step: Real, abs_tol: Real, rel_tol: Real) -> Self {
        Self {
            min_step: min_step.abs(),
            max_step: max_step.abs(),
            abs_tol,
            rel_tol,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_states: Vec::new(),
            step_handlers: Vec::new(),
        }
    }

    /// Set the derivative-evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set the bound on step attempts per run.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Register an event handler (see
    /// [`ClassicalRungeKutta::add_event_handler`](crate::ode::runge_kutta::ClassicalRungeKutta::add_event_handler)).
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

    /// Weighted RMS error estimate of a proposed step.
    ///
    /// Two independent estimators are combined: the 5th-order residual and
    /// a 3rd-order one damped by 0.01.  Either alone can read falsely small
    /// when cancellation dominates the true error; the combination guards
    /// against that.  A value below one means the step is acceptable.
    fn estimate_error(&self, k: &[Vec<Real>], y0: &[Real], y1: &[Real], h: Real) -> Real {
        let n = y0.len();
        let mut error1 = 0.0;
        let mut error2 = 0.0;
        for j in 0..n {
            let mut err_sum1 = 0.0;
            let mut err_sum2 = 0.0;
            for s in 0..12 {
                err_sum1 += E1[s] * k[s][j];
                err_sum2 += E2[s] * k[s][j];
            }
            let y_scale = y0[j].abs().max(y1[j].abs());
            let tol = self.abs_tol + self.rel_tol * y_scale;
            let ratio1 = err_sum1 / tol;
            error1 += ratio1 * ratio1;
            let ratio2 = err_sum2 / tol;
            error2 += ratio2 * ratio2;
        }
        let mut den = error1 + 0.01 * error2;
        if den <= 0.0 {
            den = 1.0;
        }
        h.abs() * error1 / (n as Real * den).sqrt()
    }

    /// Integrate `system` from `(t0, y0)` to `t_end`.
    ///
    /// The returned solution carries the time actually reached: `t_end`,
    /// or the event time when a handler stopped the run.
    ///
    /// # Errors
    /// [`Error::Precondition`] for a dimension mismatch, an empty
    /// interval, or inconsistent step bounds;
    /// [`Error::TooManyEvaluations`] / [`Error::MaxIterationsExceeded`]
    /// when a budget runs out; [`Error::Runtime`] when the error estimate
    /// turns non-finite or the step size underflows `min_step`.
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
        cm_core::ensure!(
            self.min_step > 0.0 && self.max_step >= self.min_step,
            "inconsistent step bounds [{}, {}]",
            self.min_step,
            self.max_step
        );

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

        let mut h = (0.01 * (t_end - t0).abs()).clamp(self.min_step, self.max_step) * dir;
        let mut accepted_steps = 0;
        let mut attempts = 0;

        loop {
            let mut last = false;
            if dir * (t + h - t_end) >= 0.0 {
                h = t_end - t;
                last = true;
            }

            attempts += 1;
            if attempts > self.max_iterations {
                return Err(Error::MaxIterationsExceeded {
                    max: self.max_iterations,
                });
            }

            let k = compute_stages(&mut ctx, &TABLEAU, t, &y, h, &y_dot)?;
            let y1 = combine(&y, h, &B, &k);
            let error = self.estimate_error(&k, &y, &y1, h);
            if !error.is_finite() {
                cm_core::fail!("non-finite error estimate at t = {t}, step size {h}");
            }

            let factor = (SAFETY * error.powf(EXP)).clamp(MIN_REDUCTION, MAX_GROWTH);

            if error >= 1.0 {
                // rejected: shrink and retry; events never see this step
                let h_new = (h * factor).abs();
                if h_new < self.min_step {
                    if h.abs() <= self.min_step {
                        cm_core::fail!(
                            "minimal step size ({}) reached at t = {t}, \
                             error estimate still {error}",
                            self.min_step
                        );
                    }
                    h = self.min_step * dir;
                } else {
                    h = h_new * dir;
                }
                continue;
            }

            // accepted: endpoint derivatives close the interpolation and
            // seed the next step's first stage
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

            h = (h * factor).abs().clamp(self.min_step, self.max_step) * dir;
        }
    }
}
