use criterion::{criterion_group, criterion_main, Criterion};

use cm_math::ode::dormand_prince853::DormandPrince853;
use cm_math::ode::runge_kutta::ClassicalRungeKutta;
use cm_math::ode::SystemFn;

// ---------------------------------------------------------------------------
// Problems
// ---------------------------------------------------------------------------

fn exponential() -> SystemFn<impl Fn(f64, &[f64], &mut [f64])> {
    SystemFn::new(1, |_t, y: &[f64], y_dot: &mut [f64]| y_dot[0] = y[0])
}

fn oscillator() -> SystemFn<impl Fn(f64, &[f64], &mut [f64])> {
    SystemFn::new(2, |_t, y: &[f64], y_dot: &mut [f64]| {
        y_dot[0] = y[1];
        y_dot[1] = -y[0];
    })
}

// ---------------------------------------------------------------------------
// Fixed-step RK4 vs adaptive 8(5,3)
// ---------------------------------------------------------------------------

fn exponential_to_e(c: &mut Criterion) {
    let mut g = c.benchmark_group("exponential_to_e");

    g.bench_function("rk4_h1e-3", |b| {
        let system = exponential();
        b.iter(|| {
            let mut integrator = ClassicalRungeKutta::new(1e-3);
            std::hint::black_box(integrator.integrate(&system, 0.0, &[1.0], 1.0).unwrap())
        })
    });

    g.bench_function("dop853_tol1e-12", |b| {
        let system = exponential();
        b.iter(|| {
            let mut integrator = DormandPrince853::new(1e-10, 1.0, 1e-12, 1e-12);
            std::hint::black_box(integrator.integrate(&system, 0.0, &[1.0], 1.0).unwrap())
        })
    });

    g.finish();
}

fn oscillator_full_period(c: &mut Criterion) {
    let mut g = c.benchmark_group("oscillator_full_period");
    let t_end = 2.0 * std::f64::consts::PI;

    g.bench_function("rk4_h1e-3", |b| {
        let system = oscillator();
        b.iter(|| {
            let mut integrator = ClassicalRungeKutta::new(1e-3);
            std::hint::black_box(
                integrator
                    .integrate(&system, 0.0, &[0.0, 1.0], t_end)
                    .unwrap(),
            )
        })
    });

    g.bench_function("dop853_tol1e-10", |b| {
        let system = oscillator();
        b.iter(|| {
            let mut integrator = DormandPrince853::new(1e-10, t_end, 1e-10, 1e-10);
            std::hint::black_box(
                integrator
                    .integrate(&system, 0.0, &[0.0, 1.0], t_end)
                    .unwrap(),
            )
        })
    });

    g.finish();
}

criterion_group!(benches, exponential_to_e, oscillator_full_period);
criterion_main!(benches);
