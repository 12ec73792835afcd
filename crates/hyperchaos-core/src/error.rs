//! Session-level errors
//!
//! The whole pipeline is deterministic, so an error reproduces exactly when
//! the same call is repeated. Recovery means changing the configuration, not
//! retrying.

use hyperchaos_crypto::CryptoError;
use hyperchaos_dynamics::DynamicsError;
use thiserror::Error;

/// Errors from session construction and use.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Parameters, initial conditions or derivation input are unusable
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong
        reason: String,
    },

    /// Integration of one system stopped producing a usable trajectory
    #[error("system {system} diverged: {source}")]
    NumericalDivergence {
        /// Index of the failing system
        system: usize,
        /// Integrator or verifier failure
        #[source]
        source: DynamicsError,
    },

    /// Buffer length disagrees with the expected shape
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Bytes implied by the shape
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
}

impl SessionError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    /// Lifts a dynamics error raised while processing `system`.
    pub fn from_dynamics(system: usize, err: DynamicsError) -> Self {
        match err {
            DynamicsError::InvalidConfig { reason } => {
                Self::Configuration { reason: format!("system {system}: {reason}") }
            },
            source @ DynamicsError::NumericalDivergence { .. } => {
                Self::NumericalDivergence { system, source }
            },
        }
    }

    /// Always false: identical inputs reproduce identical failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Configuration { .. }
            | Self::NumericalDivergence { .. }
            | Self::LengthMismatch { .. } => false,
        }
    }

    /// Returns true for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<CryptoError> for SessionError {
    fn from(err: CryptoError) -> Self {
        Self::Configuration { reason: err.to_string() }
    }
}
