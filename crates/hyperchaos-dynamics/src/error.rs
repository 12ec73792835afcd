//! Error types for integration and Lyapunov analysis

use std::fmt;

use thiserror::Error;

/// Why an integration was declared divergent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceCause {
    /// A state component became NaN or infinite
    NonFinite,
    /// The trajectory left the configured escape radius
    Escaped,
    /// The adaptive step shrank below the resolution of the time axis
    StepSizeCollapse,
    /// A single sample interval needed more steps than allowed
    StepBudgetExhausted,
}

impl fmt::Display for DivergenceCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite state"),
            Self::Escaped => write!(f, "state left the escape radius"),
            Self::StepSizeCollapse => write!(f, "step size collapsed"),
            Self::StepBudgetExhausted => write!(f, "step budget exhausted"),
        }
    }
}

/// Errors from integration and Lyapunov analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicsError {
    /// Configuration is unusable (non-finite values, empty sampling, etc.)
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },

    /// The solution stopped being a usable real trajectory
    #[error("numerical divergence at t = {time}: {cause}")]
    NumericalDivergence {
        /// Integration time at which divergence was detected
        time: f64,
        /// What was observed
        cause: DivergenceCause,
    },
}

impl DynamicsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }

    /// Returns true if the failure came from the numerics rather than from
    /// the configuration itself.
    pub fn is_divergence(&self) -> bool {
        matches!(self, Self::NumericalDivergence { .. })
    }
}
