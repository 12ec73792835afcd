//! Lyapunov spectrum via the discrete QR (Benettin) method.
//!
//! The state is advanced with classical RK4 and the tangent basis with the
//! variational equation `Φ' = J(x) Φ` through the same RK4 stages, so the
//! basis is propagated by the exact derivative of the discrete step. The
//! propagated basis is re-orthonormalised every iteration; the logarithms of
//! the stretching factors on the diagonal of `R` accumulate into the
//! exponents.
//!
//! The loop is inherently sequential: each iteration depends on the previous
//! state and basis.

use serde::{Deserialize, Serialize};

use crate::{
    DIM, State,
    config::SystemConfig,
    error::{DivergenceCause, DynamicsError},
    linalg::{Matrix4, QrDecomposition},
    system::HyperchaoticSystem,
};

/// Lyapunov exponents of one system, sorted descending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyapunovSpectrum {
    exponents: [f64; DIM],
}

impl LyapunovSpectrum {
    /// Sorts `exponents` descending.
    pub fn new(mut exponents: [f64; DIM]) -> Self {
        exponents.sort_by(|a, b| b.total_cmp(a));
        Self { exponents }
    }

    /// Exponents, largest first.
    pub fn exponents(&self) -> [f64; DIM] {
        self.exponents
    }

    /// Largest exponent.
    pub fn largest(&self) -> f64 {
        self.exponents[0]
    }

    /// Sum of all exponents (average phase-space contraction rate).
    pub fn sum(&self) -> f64 {
        self.exponents.iter().sum()
    }

    /// Number of strictly positive exponents.
    pub fn positive_count(&self) -> usize {
        self.exponents.iter().filter(|e| **e > 0.0).count()
    }

    /// Two largest exponents strictly positive.
    pub fn is_hyperchaotic(&self) -> bool {
        self.exponents[0] > 0.0 && self.exponents[1] > 0.0
    }

    /// Volumes contract on average.
    pub fn is_dissipative(&self) -> bool {
        self.sum() < 0.0
    }
}

/// Computes the Lyapunov spectrum of `config` from its initial condition.
///
/// Only the vector field and initial condition of `config` are used; the
/// sampling grid and tolerances belong to trajectory integration.
pub fn lyapunov_spectrum(
    config: &SystemConfig,
    iterations: usize,
    dt: f64,
) -> Result<LyapunovSpectrum, DynamicsError> {
    config.validate()?;
    if iterations == 0 {
        return Err(DynamicsError::invalid("iterations must be at least 1"));
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(DynamicsError::invalid(format!("dt must be positive and finite, got {dt}")));
    }

    let system = config.system();
    let mut state = *config.initial_condition();
    let mut basis = Matrix4::identity();
    let mut sums = [0.0; DIM];

    for step in 0..iterations {
        let (next, propagated) = variational_step(system, &state, &basis, dt);
        let time = (step + 1) as f64 * dt;

        if next.iter().any(|v| !v.is_finite()) || !propagated.is_finite() {
            return Err(DynamicsError::NumericalDivergence {
                time,
                cause: DivergenceCause::NonFinite,
            });
        }
        let Some(QrDecomposition { q, r }) = propagated.qr() else {
            return Err(DynamicsError::NumericalDivergence {
                time,
                cause: DivergenceCause::NonFinite,
            });
        };

        for (sum, stretch) in sums.iter_mut().zip(r.diagonal()) {
            *sum += stretch.abs().ln();
        }
        state = next;
        basis = q;
    }

    let total_time = iterations as f64 * dt;
    let spectrum = LyapunovSpectrum::new(sums.map(|s| s / total_time));

    tracing::debug!(
        system = system.name(),
        iterations,
        dt,
        largest = spectrum.largest(),
        sum = spectrum.sum(),
        "lyapunov spectrum computed"
    );

    Ok(spectrum)
}

/// One RK4 step of the state together with its tangent basis.
fn variational_step(
    system: &HyperchaoticSystem,
    x: &State,
    phi: &Matrix4,
    dt: f64,
) -> (State, Matrix4) {
    let rhs = |x: &State, phi: &Matrix4| (system.derivative(x), system.jacobian(x) * *phi);
    let shift = |x: &State, k: &State, s: f64| -> State {
        let mut out = *x;
        for i in 0..DIM {
            out[i] += s * k[i];
        }
        out
    };

    let (k1, p1) = rhs(x, phi);
    let (k2, p2) = rhs(&shift(x, &k1, 0.5 * dt), &(*phi + p1.scale(0.5 * dt)));
    let (k3, p3) = rhs(&shift(x, &k2, 0.5 * dt), &(*phi + p2.scale(0.5 * dt)));
    let (k4, p4) = rhs(&shift(x, &k3, dt), &(*phi + p3.scale(dt)));

    let mut next = *x;
    for i in 0..DIM {
        next[i] += dt * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) / 6.0;
    }
    let increment = p1 + p2.scale(2.0) + p3.scale(2.0) + p4;
    (next, *phi + increment.map(|v| dt * v / 6.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_is_sorted_descending() {
        let spectrum = LyapunovSpectrum::new([-3.0, 0.5, 0.0, 2.0]);
        assert_eq!(spectrum.exponents(), [2.0, 0.5, 0.0, -3.0]);
        assert_eq!(spectrum.largest(), 2.0);
        assert_eq!(spectrum.sum(), -0.5);
        assert_eq!(spectrum.positive_count(), 2);
        assert!(spectrum.is_hyperchaotic());
        assert!(spectrum.is_dissipative());
    }

    #[test]
    fn dissipation_follows_the_sign_of_the_sum() {
        // Two positive exponents but volumes grow.
        let expanding = LyapunovSpectrum::new([-1.0, 0.5, 0.0, 2.0]);
        assert_eq!(expanding.sum(), 1.5);
        assert!(expanding.is_hyperchaotic());
        assert!(!expanding.is_dissipative());

        // Conservative spectra are not dissipative either.
        assert!(!LyapunovSpectrum::new([1.0, 0.5, -0.5, -1.0]).is_dissipative());
        assert!(LyapunovSpectrum::new([0.0, 0.0, 0.0, -0.25]).is_dissipative());
    }

    #[test]
    fn classification_needs_two_positive() {
        let spectrum = LyapunovSpectrum::new([0.9, 0.0, -0.1, -5.0]);
        assert!(!spectrum.is_hyperchaotic());
        assert_eq!(spectrum.positive_count(), 1);
    }

    #[test]
    fn fixed_point_spectrum_matches_eigenvalues() {
        // At the origin the Lorenz Jacobian is constant with eigenvalues
        // (-11 ± √1201) / 2, -1 and -8/3.
        let config = SystemConfig::new(HyperchaoticSystem::LORENZ, [0.0; 4]);
        let spectrum = lyapunov_spectrum(&config, 20_000, 0.01).unwrap();

        let root = 1201.0_f64.sqrt();
        let expected = [(-11.0 + root) / 2.0, -1.0, -8.0 / 3.0, (-11.0 - root) / 2.0];
        for (got, want) in spectrum.exponents().iter().zip(expected) {
            assert!((got - want).abs() < 0.05, "got {:?}, want {expected:?}", spectrum.exponents());
        }
    }

    #[test]
    fn spectrum_is_deterministic() {
        let config = SystemConfig::reference_set().remove(1);
        let a = lyapunov_spectrum(&config, 500, 0.01).unwrap();
        let b = lyapunov_spectrum(&config, 500, 0.01).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_zero_iterations_and_bad_dt() {
        let config = SystemConfig::reference_set().remove(0);
        assert!(matches!(
            lyapunov_spectrum(&config, 0, 0.01),
            Err(DynamicsError::InvalidConfig { .. })
        ));
        assert!(lyapunov_spectrum(&config, 10, 0.0).is_err());
        assert!(lyapunov_spectrum(&config, 10, f64::NAN).is_err());
    }

    #[test]
    fn exploding_state_is_divergence() {
        let config = SystemConfig::new(HyperchaoticSystem::ROSSLER, [0.1; 4]);
        let err = lyapunov_spectrum(&config, 100_000, 0.05).unwrap_err();
        assert!(err.is_divergence(), "unexpected error: {err:?}");
    }
}
