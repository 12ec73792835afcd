//! Integration configuration
//!
//! A [`SystemConfig`] fixes everything a trajectory depends on: the vector
//! field, its initial condition, the sampling grid, the solver tolerances and
//! the divergence guards. Configurations are plain values; changing any field
//! produces a new configuration.

use serde::{Deserialize, Serialize};

use crate::{State, error::DynamicsError, system::HyperchaoticSystem};

/// Default integration horizon in time units.
pub const DEFAULT_HORIZON: f64 = 100.0;

/// Default number of uniform samples on `[0, horizon]`.
pub const DEFAULT_SAMPLES: usize = 100_000;

/// Default number of leading samples discarded as transient.
pub const DEFAULT_TRANSIENT: usize = 1_000;

/// Default escape radius. Any sample with a component beyond it is treated
/// as divergent.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 1e6;

/// Default limit on attempted solver steps between two consecutive samples.
pub const DEFAULT_MAX_STEPS_PER_SAMPLE: usize = 50_000;

/// Absolute and relative error tolerances for the adaptive solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Absolute tolerance
    pub atol: f64,
    /// Relative tolerance
    pub rtol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { atol: 1e-9, rtol: 1e-9 }
    }
}

/// Everything needed to reproduce one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    system: HyperchaoticSystem,
    initial_condition: State,
    #[serde(default = "default_horizon")]
    horizon: f64,
    #[serde(default = "default_samples")]
    samples: usize,
    #[serde(default = "default_transient")]
    transient: usize,
    #[serde(default)]
    tolerances: Tolerances,
    #[serde(default = "default_escape_radius")]
    escape_radius: f64,
    #[serde(default = "default_max_steps")]
    max_steps_per_sample: usize,
}

fn default_horizon() -> f64 {
    DEFAULT_HORIZON
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_transient() -> usize {
    DEFAULT_TRANSIENT
}

fn default_escape_radius() -> f64 {
    DEFAULT_ESCAPE_RADIUS
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS_PER_SAMPLE
}

impl SystemConfig {
    /// Creates a configuration with the default sampling grid and tolerances.
    pub fn new(system: HyperchaoticSystem, initial_condition: State) -> Self {
        Self {
            system,
            initial_condition,
            horizon: DEFAULT_HORIZON,
            samples: DEFAULT_SAMPLES,
            transient: DEFAULT_TRANSIENT,
            tolerances: Tolerances::default(),
            escape_radius: DEFAULT_ESCAPE_RADIUS,
            max_steps_per_sample: DEFAULT_MAX_STEPS_PER_SAMPLE,
        }
    }

    /// The three bundled configurations, in session order.
    pub fn reference_set() -> Vec<Self> {
        vec![
            Self::new(HyperchaoticSystem::ROSSLER, [-10.0, -6.0, 0.0, 10.0]),
            Self::new(HyperchaoticSystem::CHEN, [1.0, 1.0, 1.0, 1.0]),
            Self::new(HyperchaoticSystem::LORENZ, [1.0, 1.0, 1.0, 1.0]),
        ]
    }

    /// Replaces the initial condition.
    #[must_use]
    pub fn with_initial_condition(mut self, initial_condition: State) -> Self {
        self.initial_condition = initial_condition;
        self
    }

    /// Replaces the sampling grid.
    #[must_use]
    pub fn with_sampling(mut self, horizon: f64, samples: usize, transient: usize) -> Self {
        self.horizon = horizon;
        self.samples = samples;
        self.transient = transient;
        self
    }

    /// Replaces the solver tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Replaces the escape radius.
    #[must_use]
    pub fn with_escape_radius(mut self, escape_radius: f64) -> Self {
        self.escape_radius = escape_radius;
        self
    }

    /// Replaces the per-interval step budget.
    #[must_use]
    pub fn with_max_steps_per_sample(mut self, max_steps: usize) -> Self {
        self.max_steps_per_sample = max_steps;
        self
    }

    /// Vector field.
    pub fn system(&self) -> &HyperchaoticSystem {
        &self.system
    }

    /// Initial condition at `t = 0`.
    pub fn initial_condition(&self) -> &State {
        &self.initial_condition
    }

    /// Integration horizon.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Total number of samples, transient included.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of leading samples discarded.
    pub fn transient(&self) -> usize {
        self.transient
    }

    /// Solver tolerances.
    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Escape radius.
    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    /// Attempted-step budget between consecutive samples.
    pub fn max_steps_per_sample(&self) -> usize {
        self.max_steps_per_sample
    }

    /// Spacing of the sampling grid.
    ///
    /// A grid of fewer than two samples has no spacing; it is reported as the
    /// whole horizon and [`validate`](Self::validate) rejects it.
    pub fn sample_interval(&self) -> f64 {
        self.horizon / self.samples.saturating_sub(1).max(1) as f64
    }

    /// Number of samples kept after the transient is discarded.
    pub fn retained_len(&self) -> usize {
        self.samples.saturating_sub(self.transient)
    }

    /// Checks that the configuration can be integrated at all.
    pub fn validate(&self) -> Result<(), DynamicsError> {
        self.system.validate()?;

        if self.initial_condition.iter().any(|v| !v.is_finite()) {
            return Err(DynamicsError::invalid(format!(
                "initial condition {:?} is not finite",
                self.initial_condition
            )));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "horizon must be positive and finite, got {}",
                self.horizon
            )));
        }
        if self.samples < 2 {
            return Err(DynamicsError::invalid(format!(
                "samples must be at least 2, got {}",
                self.samples
            )));
        }
        if self.transient >= self.samples {
            return Err(DynamicsError::invalid(format!(
                "transient ({}) must be smaller than samples ({})",
                self.transient, self.samples
            )));
        }

        let Tolerances { atol, rtol } = self.tolerances;
        if !(atol.is_finite() && atol > 0.0 && rtol.is_finite() && rtol >= 0.0) {
            return Err(DynamicsError::invalid(format!(
                "tolerances must be finite with atol > 0 and rtol >= 0, got atol={atol} rtol={rtol}"
            )));
        }
        if self.escape_radius.is_nan() || self.escape_radius <= 0.0 {
            return Err(DynamicsError::invalid(format!(
                "escape radius must be positive, got {}",
                self.escape_radius
            )));
        }
        if self.max_steps_per_sample == 0 {
            return Err(DynamicsError::invalid("step budget must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rossler() -> SystemConfig {
        SystemConfig::reference_set().remove(0)
    }

    #[test]
    fn reference_set_is_valid() {
        let configs = SystemConfig::reference_set();
        assert_eq!(configs.len(), 3);
        for config in &configs {
            config.validate().unwrap();
            assert_eq!(config.retained_len(), 99_000);
        }
    }

    #[test]
    fn sample_interval_spans_horizon() {
        let config = rossler().with_sampling(10.0, 11, 0);
        assert_eq!(config.sample_interval(), 1.0);
    }

    #[test]
    fn degenerate_grid_reports_whole_horizon() {
        for samples in [0, 1] {
            let config = rossler().with_sampling(10.0, samples, 0);
            assert_eq!(config.sample_interval(), 10.0);
            assert!(matches!(config.validate(), Err(DynamicsError::InvalidConfig { .. })));
        }
    }

    #[test]
    fn rejects_transient_covering_all_samples() {
        let config = rossler().with_sampling(10.0, 100, 100);
        assert!(matches!(config.validate(), Err(DynamicsError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_single_sample() {
        let config = rossler().with_sampling(10.0, 1, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_initial_condition() {
        let config = rossler().with_initial_condition([0.0, f64::NAN, 0.0, 0.0]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_horizon_and_tolerances() {
        assert!(rossler().with_sampling(0.0, 10, 0).validate().is_err());
        assert!(rossler().with_sampling(f64::INFINITY, 10, 0).validate().is_err());
        let tol = Tolerances { atol: 0.0, rtol: 1e-9 };
        assert!(rossler().with_tolerances(tol).validate().is_err());
        assert!(rossler().with_escape_radius(f64::NAN).validate().is_err());
        assert!(rossler().with_max_steps_per_sample(0).validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "system": { "kind": "lorenz", "sigma": 10.0, "rho": 28.0, "beta": 2.0, "k": -1.0 },
            "initial_condition": [1.0, 2.0, 3.0, 4.0]
        }"#;
        let config: SystemConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.samples(), DEFAULT_SAMPLES);
        assert_eq!(config.transient(), DEFAULT_TRANSIENT);
        assert_eq!(config.tolerances(), Tolerances::default());
        assert_eq!(config.initial_condition(), &[1.0, 2.0, 3.0, 4.0]);
    }
}
