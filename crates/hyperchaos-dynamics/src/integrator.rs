//! Adaptive Dormand-Prince 5(4) integration
//!
//! The solver advances with the fifth-order solution and controls the step
//! with the embedded fourth-order error estimate (FSAL: the last stage of an
//! accepted step is the first stage of the next). Output is taken on the
//! uniform grid `t_k = horizon * k / (samples - 1)`; the final step into each
//! grid point is shortened to land on it exactly, so no interpolation is
//! involved.
//!
//! Divergence is detected three ways:
//!
//! - a sample with a non-finite component, or one beyond the escape radius
//! - a proposed step below the resolution of `t`
//! - more attempted steps between two samples than the configured budget

use crate::{
    DIM, State,
    config::{SystemConfig, Tolerances},
    error::{DivergenceCause, DynamicsError},
    system::HyperchaoticSystem,
    trajectory::Trajectory,
};

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth-order minus fourth-order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Smallest step, relative to `max(1, |t|)`, before the solver gives up.
const STEP_FLOOR: f64 = 1e-12;

struct Trial {
    y: State,
    k7: State,
    error: State,
}

/// Integrates `config` and returns the samples after the transient.
///
/// Pure: identical configurations give bit-identical trajectories.
pub fn integrate(config: &SystemConfig) -> Result<Trajectory, DynamicsError> {
    config.validate()?;

    let system = config.system();
    let tolerances = config.tolerances();
    let samples = config.samples();
    let transient = config.transient();
    let horizon = config.horizon();
    let last_index = (samples - 1) as f64;

    let mut y = *config.initial_condition();
    let mut k1 = system.derivative(&y);
    let mut h = config.sample_interval();
    let mut t = 0.0_f64;

    let mut points = Vec::with_capacity(config.retained_len());
    if transient == 0 {
        points.push(y);
    }

    let mut accepted = 0_usize;
    let mut rejected = 0_usize;

    for sample in 1..samples {
        let t_end = horizon * sample as f64 / last_index;
        let mut attempts = 0_usize;

        while t < t_end {
            attempts += 1;
            if attempts > config.max_steps_per_sample() {
                return Err(diverged(t, DivergenceCause::StepBudgetExhausted));
            }
            if h <= STEP_FLOOR * t.abs().max(1.0) {
                return Err(diverged(t, DivergenceCause::StepSizeCollapse));
            }

            let remaining = t_end - t;
            let (step, lands) = if h >= remaining { (remaining, true) } else { (h, false) };

            let trial = dopri_step(system, &y, &k1, step);
            let norm = error_norm(&trial.error, &y, &trial.y, tolerances);
            if !norm.is_finite() {
                rejected += 1;
                h = step * MIN_FACTOR;
                continue;
            }

            let factor = step_factor(norm);
            if norm <= 1.0 {
                t = if lands { t_end } else { t + step };
                y = trial.y;
                k1 = trial.k7;
                h = if lands { h.max(step * factor) } else { step * factor };
                accepted += 1;
            } else {
                h = step * factor;
                rejected += 1;
            }
        }

        if y.iter().any(|v| !v.is_finite()) {
            return Err(diverged(t, DivergenceCause::NonFinite));
        }
        if y.iter().any(|v| v.abs() > config.escape_radius()) {
            return Err(diverged(t, DivergenceCause::Escaped));
        }
        if sample >= transient {
            points.push(y);
        }
    }

    tracing::debug!(
        system = system.name(),
        accepted,
        rejected,
        retained = points.len(),
        "integration complete"
    );

    let start_time = horizon * transient as f64 / last_index;
    Ok(Trajectory::new(points, config.sample_interval(), start_time))
}

fn diverged(time: f64, cause: DivergenceCause) -> DynamicsError {
    tracing::warn!(time, %cause, "integration diverged");
    DynamicsError::NumericalDivergence { time, cause }
}

fn dopri_step(system: &HyperchaoticSystem, y: &State, k1: &State, h: f64) -> Trial {
    let k2 = system.derivative(&combine(y, h, &[(A21, k1)]));
    let k3 = system.derivative(&combine(y, h, &[(A31, k1), (A32, &k2)]));
    let k4 = system.derivative(&combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]));
    let k5 =
        system.derivative(&combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]));
    let k6 = system.derivative(&combine(y, h, &[
        (A61, k1),
        (A62, &k2),
        (A63, &k3),
        (A64, &k4),
        (A65, &k5),
    ]));
    let next = combine(y, h, &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)]);
    let k7 = system.derivative(&next);

    let mut error = [0.0; DIM];
    for i in 0..DIM {
        error[i] = h
            * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
    }

    Trial { y: next, k7, error }
}

/// `y + h * Σ c_j k_j`, summing the stages in the order given.
fn combine(y: &State, h: f64, terms: &[(f64, &State)]) -> State {
    let mut out = [0.0; DIM];
    for i in 0..DIM {
        let mut acc = 0.0;
        for (c, k) in terms {
            acc += c * k[i];
        }
        out[i] = y[i] + h * acc;
    }
    out
}

/// RMS of the error scaled by `atol + rtol * max(|y|, |y_next|)`.
fn error_norm(error: &State, y: &State, next: &State, tol: Tolerances) -> f64 {
    let mut acc = 0.0;
    for i in 0..DIM {
        let scale = tol.atol + tol.rtol * y[i].abs().max(next[i].abs());
        let r = error[i] / scale;
        acc += r * r;
    }
    (acc / DIM as f64).sqrt()
}

fn step_factor(norm: f64) -> f64 {
    if norm == 0.0 { MAX_FACTOR } else { (SAFETY * norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR) }
}
