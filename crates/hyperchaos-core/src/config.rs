//! Session configuration
//!
//! [`SessionConfig::default`] is the reference configuration: the Rössler,
//! Chen and Lorenz hyperchaotic systems in that order, each sampled 100 000
//! times over 100 time units with the first 1 000 samples discarded.
//!
//! # Seed modes
//!
//! Under [`SeedMode::Fixed`] the seed is hashed into the session's seed state
//! but does not influence the initial conditions, so every seed yields the
//! same session. [`SeedMode::Perturb`] offsets each initial condition by a
//! seed-derived amount and then lets the system run for a warmup period, so
//! the small offset has grown to the size of the attractor before the first
//! sample that feeds the key and S-box is taken.

use std::collections::BTreeMap;

use hyperchaos_dynamics::{State, SystemConfig};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Default bound on seed-derived initial-condition offsets.
pub const DEFAULT_PERTURBATION: f64 = 0.1;

/// Default time a perturbed system runs before its sampled integration.
///
/// The slowest bundled system (Rössler, λ1 ≈ 0.11) amplifies an offset of
/// 0.1 past the attractor size in well under this time.
pub const DEFAULT_WARMUP: f64 = 100.0;

fn default_warmup() -> f64 {
    DEFAULT_WARMUP
}

/// How the seed affects initial conditions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeedMode {
    /// Initial conditions are used as configured
    #[default]
    Fixed,
    /// Every component is offset by a seed-derived value in
    /// `[-magnitude, magnitude]`, then the system is advanced by `warmup`
    /// time units and the resulting state becomes the initial condition
    Perturb {
        /// Largest absolute offset
        magnitude: f64,
        /// Time integrated before sampling starts
        #[serde(default = "default_warmup")]
        warmup: f64,
    },
}

impl SeedMode {
    /// Perturbation with [`DEFAULT_PERTURBATION`] and [`DEFAULT_WARMUP`].
    pub fn perturb() -> Self {
        Self::Perturb { magnitude: DEFAULT_PERTURBATION, warmup: DEFAULT_WARMUP }
    }
}

/// Per-system initial-condition overrides, keyed by system index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialConditions {
    overrides: BTreeMap<usize, State>,
}

impl InitialConditions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the override for `system`.
    #[must_use]
    pub fn with(mut self, system: usize, state: State) -> Self {
        self.overrides.insert(system, state);
        self
    }

    /// Override for `system`, if any.
    pub fn get(&self, system: usize) -> Option<&State> {
        self.overrides.get(&system)
    }

    /// True if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Overrides in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &State)> {
        self.overrides.iter().map(|(index, state)| (*index, state))
    }
}

/// Everything a session is built from apart from the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Systems in round order
    pub systems: Vec<SystemConfig>,
    /// How the seed affects initial conditions
    #[serde(default)]
    pub seed_mode: SeedMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { systems: SystemConfig::reference_set(), seed_mode: SeedMode::Fixed }
    }
}

impl SessionConfig {
    /// Replaces the seed mode.
    #[must_use]
    pub fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = seed_mode;
        self
    }

    /// Applies initial-condition overrides.
    ///
    /// Fails if an override names a system that does not exist.
    pub fn with_initial_conditions(
        mut self,
        initial_conditions: &InitialConditions,
    ) -> Result<Self, SessionError> {
        let count = self.systems.len();
        for (index, state) in initial_conditions.iter() {
            let Some(system) = self.systems.get_mut(index) else {
                return Err(SessionError::configuration(format!(
                    "initial condition override for system {index}, but only {count} systems exist"
                )));
            };
            *system = system.clone().with_initial_condition(*state);
        }
        Ok(self)
    }

    /// Checks every system and the seed mode.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.systems.is_empty() {
            return Err(SessionError::configuration("at least one system is required"));
        }
        for (index, system) in self.systems.iter().enumerate() {
            system.validate().map_err(|err| SessionError::from_dynamics(index, err))?;
        }
        if let SeedMode::Perturb { magnitude, warmup } = self.seed_mode {
            if !(magnitude.is_finite() && magnitude >= 0.0) {
                return Err(SessionError::configuration(format!(
                    "perturbation magnitude must be finite and non-negative, got {magnitude}"
                )));
            }
            if !(warmup.is_finite() && warmup >= 0.0) {
                return Err(SessionError::configuration(format!(
                    "warmup must be finite and non-negative, got {warmup}"
                )));
            }
        }
        Ok(())
    }
}
