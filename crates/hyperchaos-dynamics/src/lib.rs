//! Hyperchaotic Dynamics
//!
//! Continuous-time 4-dimensional hyperchaotic systems, the adaptive ODE
//! integrator that turns them into trajectories, and the Lyapunov verifier
//! that checks a configuration is actually hyperchaotic. Everything here is a
//! pure function of its inputs: identical configurations and tolerances give
//! bit-identical trajectories.
//!
//! # Pipeline
//!
//! ```text
//! SystemConfig (vector field, parameters, initial condition)
//!        │
//!        ▼ Dormand-Prince 5(4), atol = rtol = 1e-9
//! Uniform samples on [0, horizon]
//!        │
//!        ▼ drop transient prefix
//! Trajectory
//! ```
//!
//! The verifier runs independently of the integrator:
//!
//! ```text
//! SystemConfig ──► RK4 + variational equation ──► QR every step ──► spectrum
//! ```
//!
//! # Failure Model
//!
//! Integration never repairs a configuration. Non-finite states, a collapsing
//! step size, or a trajectory leaving the escape radius all surface as
//! [`DynamicsError::NumericalDivergence`]. Retrying an identical call
//! reproduces the identical failure.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod integrator;
pub mod linalg;
pub mod lyapunov;
pub mod system;
pub mod trajectory;

pub use config::{SystemConfig, Tolerances};
pub use error::{DivergenceCause, DynamicsError};
pub use integrator::integrate;
pub use linalg::{Matrix4, QrDecomposition};
pub use lyapunov::{LyapunovSpectrum, lyapunov_spectrum};
pub use system::HyperchaoticSystem;
pub use trajectory::Trajectory;

/// Dimension of every supported state space.
pub const DIM: usize = 4;

/// A point in the 4-dimensional state space.
pub type State = [f64; DIM];
